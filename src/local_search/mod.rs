//! Local search operators for route refinement.
//!
//! All operators work on a customer permutation (depot implicit at both
//! ends) and take the route cost as an injected function, so the same
//! engine refines both customer-scale and cluster-scale routes. None of
//! them ever worsens its input; a pass that finds no improvement returns
//! the route unchanged, which is expected rather than an error.

pub mod lin_kernighan;
pub mod segment_reversal;
pub mod two_opt;

use crate::pheromone::EdgeKey;
use rand::Rng;
use std::collections::HashMap;

/// Acceptance threshold: a move must shorten the route by more than this.
pub(crate) const IMPROVEMENT_EPS: f64 = 1e-9;

/// Manages the refinement phase shared by the constructors and the genetic
/// layer.
pub struct LocalSearch {
    /// Attempt budget for the pheromone-weighted segment reversal.
    pub random_search_iterations: usize,
    /// Stagnant-pass budget for the complete 2-opt search.
    pub two_opt_iterations: usize,
    /// Pheromone over route *position* pairs, biasing which segment the
    /// random reversal tries next. Rebuilt when the route size changes.
    segment_pheromone: HashMap<EdgeKey, f64>,
    segment_positions: usize,
}

impl LocalSearch {
    /// Create a new local search engine with the given iteration budgets.
    pub fn new(random_search_iterations: usize, two_opt_iterations: usize) -> Self {
        LocalSearch {
            random_search_iterations,
            two_opt_iterations,
            segment_pheromone: HashMap::new(),
            segment_positions: 0,
        }
    }

    /// The composite refinement pass: pheromone-weighted segment reversal
    /// followed by a complete 2-opt. Used as the genetic mutation operator
    /// and as post-construction polish.
    pub fn refine<R: Rng>(
        &mut self,
        route: &mut [usize],
        cost: &impl Fn(&[usize]) -> f64,
        rng: &mut R,
    ) {
        self.segment_reversal(route, cost, rng);
        self.two_opt(route, cost);
    }

    /// (Re)initialize the position-pair pheromone table for routes of
    /// `positions` slots. Every pair starts at weight 1.
    pub(crate) fn ensure_segment_pheromone(&mut self, positions: usize) {
        if self.segment_positions == positions {
            return;
        }
        self.segment_pheromone.clear();
        for i in 0..positions {
            for j in i + 1..positions {
                self.segment_pheromone.insert(EdgeKey::new(i, j), 1.0);
            }
        }
        self.segment_positions = positions;
    }

    /// Sample a position pair with probability proportional to its local
    /// pheromone weight: cumulative-weight table, uniform draw, linear scan.
    pub(crate) fn sample_segment<R: Rng>(&self, rng: &mut R) -> (usize, usize) {
        let positions = self.segment_positions;
        let total: f64 = self.segment_pheromone.values().sum();
        let draw = rng.gen_range(0.0..total);

        let mut cumulative = 0.0;
        for i in 0..positions {
            for j in i + 1..positions {
                cumulative += self.segment_pheromone[&EdgeKey::new(i, j)];
                if draw <= cumulative {
                    return (i, j);
                }
            }
        }
        (positions - 2, positions - 1)
    }

    /// Reinforce the position pair that produced an accepted reversal by
    /// the length improvement it achieved.
    pub(crate) fn reinforce_segment(&mut self, x: usize, y: usize, improvement: f64) {
        if let Some(weight) = self.segment_pheromone.get_mut(&EdgeKey::new(x, y)) {
            *weight += improvement;
        }
    }

    /// Multiplicative decay of all local pheromones, run at the end of
    /// every reversal call. Weights at or below 1 are left alone, which
    /// keeps the table strictly positive.
    pub(crate) fn decay_segment_pheromone(&mut self) {
        for weight in self.segment_pheromone.values_mut() {
            if *weight > 1.0 {
                *weight *= 0.8;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn segment_weight(&self, x: usize, y: usize) -> f64 {
        self.segment_pheromone
            .get(&EdgeKey::new(x, y))
            .copied()
            .unwrap_or(0.0)
    }
}
