//! Sparse symmetric pheromone graph shared by the constructors.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::collections::HashMap;

/// Canonical unordered node-pair key: `(a, b)` and `(b, a)` resolve to the
/// same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey(usize, usize);

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }
}

/// Edge-weight map over a fixed site set with decay and reinforcement.
///
/// Invariant: every stored weight is strictly positive. Decay multiplies by
/// a factor in (0, 1) and reinforcement adds a positive term, so the
/// invariant holds across updates; the max-min clamp keeps weights inside
/// `[tau_min, tau_max]` with `tau_min > 0`.
#[derive(Debug, Clone)]
pub struct PheromoneGraph {
    weights: HashMap<EdgeKey, f64>,
    sites: usize,
}

impl PheromoneGraph {
    /// Initialize every edge among `sites` nodes with an independent random
    /// weight in (0.1, 1.0).
    pub fn new<R: Rng>(sites: usize, rng: &mut R) -> Self {
        let initial = Uniform::new(0.1, 1.0);
        let mut weights = HashMap::with_capacity(sites * sites.saturating_sub(1) / 2);

        for i in 0..sites {
            for j in i + 1..sites {
                weights.insert(EdgeKey::new(i, j), initial.sample(rng));
            }
        }

        PheromoneGraph { weights, sites }
    }

    /// Number of sites the graph spans.
    pub fn sites(&self) -> usize {
        self.sites
    }

    /// Pheromone weight on the edge between `a` and `b`.
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.weights.get(&EdgeKey::new(a, b)).copied().unwrap_or(0.0)
    }

    /// Multiply every edge weight by `factor`. Applied once per outer
    /// iteration, before reinforcement.
    pub fn decay(&mut self, factor: f64) {
        for weight in self.weights.values_mut() {
            *weight *= factor;
        }
    }

    /// Add `amount` to the edge between `a` and `b`.
    pub fn reinforce(&mut self, a: usize, b: usize, amount: f64) {
        if let Some(weight) = self.weights.get_mut(&EdgeKey::new(a, b)) {
            *weight += amount;
        }
    }

    /// Reinforce every edge traversed by `route` with `amount`.
    pub fn reinforce_route(&mut self, route: &[usize], amount: f64) {
        for pair in route.windows(2) {
            self.reinforce(pair[0], pair[1], amount);
        }
    }

    /// Clamp every edge weight into `[tau_min, tau_max]` (max-min variant).
    pub fn clamp(&mut self, tau_min: f64, tau_max: f64) {
        for weight in self.weights.values_mut() {
            *weight = weight.clamp(tau_min, tau_max);
        }
    }

    /// Smallest weight currently stored.
    pub fn min_weight(&self) -> f64 {
        self.weights
            .values()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest weight currently stored.
    pub fn max_weight(&self) -> f64 {
        self.weights
            .values()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
