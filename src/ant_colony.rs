//! Probabilistic route construction guided by the pheromone graph.

use crate::config::{Config, PheromonePolicy};
use crate::pheromone::PheromoneGraph;
use crate::problem::Problem;
use crate::SolverError;
use log::{debug, warn};
use rand::Rng;
use std::f64;

/// The index space an ant colony constructs routes over: raw customers or
/// clusters. Distances may be infinite (blocked arcs); stations and battery
/// only exist in customer space.
pub trait SearchSpace {
    /// Number of sites, including the depot site.
    fn num_sites(&self) -> usize;

    /// The site every route starts from.
    fn depot(&self) -> usize;

    /// Whether the site must be covered by a valid route.
    fn is_customer(&self, site: usize) -> bool;

    /// Whether the site recharges the battery when visited.
    fn is_station(&self, _site: usize) -> bool {
        false
    }

    fn distance(&self, a: usize, b: usize) -> f64;

    fn energy(&self, _a: usize, _b: usize) -> f64 {
        0.0
    }

    fn battery_capacity(&self) -> f64 {
        f64::INFINITY
    }

    fn arc_exists(&self, a: usize, b: usize) -> bool {
        self.distance(a, b).is_finite()
    }
}

/// The full node set of a problem instance as a search space.
pub struct CustomerSpace<'a> {
    problem: &'a Problem,
}

impl<'a> CustomerSpace<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        CustomerSpace { problem }
    }
}

impl SearchSpace for CustomerSpace<'_> {
    fn num_sites(&self) -> usize {
        self.problem.node_count()
    }

    fn depot(&self) -> usize {
        self.problem.depot
    }

    fn is_customer(&self, site: usize) -> bool {
        site != self.problem.depot && !self.problem.is_charging_station(site)
    }

    fn is_station(&self, site: usize) -> bool {
        site != self.problem.depot && self.problem.is_charging_station(site)
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        self.problem.distance(a, b)
    }

    fn energy(&self, a: usize, b: usize) -> f64 {
        self.problem.energy(a, b)
    }

    fn battery_capacity(&self) -> f64 {
        self.problem.battery_capacity
    }
}

/// Ant colony route constructor, parametrized by the pheromone-update
/// policy rather than specialized per variant.
pub struct AntColony<'a, S: SearchSpace> {
    space: &'a S,
    policy: PheromonePolicy,
    num_ants: usize,
    pheromone_decay: f64,
    q: f64,
    alpha: f64,
    beta: f64,
    p_best: f64,
    construction_retries: usize,
    pheromones: PheromoneGraph,
    best_route: Option<Vec<usize>>,
    best_length: f64,
}

impl<'a, S: SearchSpace> AntColony<'a, S> {
    /// Create a constructor over `space` with randomly seeded pheromones.
    pub fn new<R: Rng>(space: &'a S, config: &Config, rng: &mut R) -> Self {
        AntColony {
            space,
            policy: config.policy,
            num_ants: config.num_ants,
            pheromone_decay: config.pheromone_decay,
            q: config.q,
            alpha: config.alpha,
            beta: config.beta,
            p_best: config.p_best,
            construction_retries: config.construction_retries,
            pheromones: PheromoneGraph::new(space.num_sites(), rng),
            best_route: None,
            best_length: f64::INFINITY,
        }
    }

    /// The best route found so far, starting at the depot site. The closing
    /// arc back to the depot is implicit.
    pub fn best_route(&self) -> Option<&[usize]> {
        self.best_route.as_deref()
    }

    pub fn best_length(&self) -> f64 {
        self.best_length
    }

    pub fn pheromones(&self) -> &PheromoneGraph {
        &self.pheromones
    }

    /// Run `iterations` outer iterations: every agent constructs one valid
    /// route (restarting on deadlock), the best-so-far record is updated,
    /// and the pheromone graph is decayed and reinforced once.
    pub fn optimize<R: Rng>(
        &mut self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<(), SolverError> {
        for iteration in 1..=iterations {
            let mut routes = Vec::with_capacity(self.num_ants);

            for _ in 0..self.num_ants {
                let route = self.build_route(rng)?;
                let length = self.route_length(&route);

                if length < self.best_length {
                    if self.route_is_valid(&route) {
                        debug!(
                            "iteration {}: new best route, length {:.3}",
                            iteration, length
                        );
                        self.best_length = length;
                        self.best_route = Some(route.clone());
                    } else {
                        warn!("discarding invalid candidate for best-so-far");
                    }
                }

                routes.push((route, length));
            }

            self.update_pheromones(&routes);
        }
        Ok(())
    }

    /// Construct one valid route, restarting on deadlock up to the
    /// configured retry budget.
    pub fn build_route<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>, SolverError> {
        for _ in 0..self.construction_retries {
            if let Some(route) = self.construct(rng) {
                return Ok(route);
            }
        }
        Err(SolverError::InfeasibleConstruction {
            attempts: self.construction_retries,
        })
    }

    /// One construction attempt. Returns `None` on deadlock: no feasible
    /// successor before every customer is visited, or no feasible arc back
    /// to the depot from the final node.
    fn construct<R: Rng>(&self, rng: &mut R) -> Option<Vec<usize>> {
        let depot = self.space.depot();
        let sites = self.space.num_sites();
        let target = (0..sites).filter(|&s| self.space.is_customer(s)).count();
        // Station detours can lengthen the route, but never past this.
        let max_len = 2 * sites + 2;

        let mut route = vec![depot];
        let mut visited = vec![false; sites];
        let mut remaining = target;
        let mut battery = self.space.battery_capacity();

        while remaining > 0 {
            if route.len() > max_len {
                return None;
            }
            let current = *route.last().unwrap();

            let next = match self.select_next(current, &visited, battery, rng) {
                Some(next) => next,
                None => return None,
            };

            battery -= self.space.energy(current, next);
            if self.space.is_station(next) {
                battery = self.space.battery_capacity();
            } else {
                visited[next] = true;
                remaining -= 1;
            }
            route.push(next);
        }

        let last = *route.last().unwrap();
        let charging_aware = self.policy == PheromonePolicy::ChargingAware;
        if !self.space.arc_exists(last, depot)
            || (charging_aware && self.space.energy(last, depot) > battery)
        {
            return None;
        }

        Some(route)
    }

    /// Choose the next site from `current`.
    ///
    /// Every unvisited reachable customer is scored with the desirability
    /// heuristic; the successor is drawn uniformly among all candidates tied
    /// for the maximum selection weight. Under the charging-aware policy,
    /// stations become candidates only when no customer is reachable on the
    /// remaining battery.
    fn select_next<R: Rng>(
        &self,
        current: usize,
        visited: &[bool],
        battery: f64,
        rng: &mut R,
    ) -> Option<usize> {
        let charging_aware = self.policy == PheromonePolicy::ChargingAware;

        let customers: Vec<usize> = (0..self.space.num_sites())
            .filter(|&s| {
                self.space.is_customer(s)
                    && !visited[s]
                    && s != current
                    && self.space.arc_exists(current, s)
                    && (!charging_aware || self.space.energy(current, s) <= battery)
            })
            .collect();

        if !customers.is_empty() {
            return self.pick_most_desirable(current, &customers, rng);
        }

        if charging_aware {
            // Battery would otherwise deplete; recharge stops become eligible.
            let stations: Vec<usize> = (0..self.space.num_sites())
                .filter(|&s| {
                    self.space.is_station(s)
                        && s != current
                        && self.space.arc_exists(current, s)
                        && self.space.energy(current, s) <= battery
                })
                .collect();
            if !stations.is_empty() {
                return self.pick_most_desirable(current, &stations, rng);
            }
        }

        None
    }

    /// Desirability-weighted greedy pick with a uniform draw among all
    /// candidates tied for the maximum.
    fn pick_most_desirable<R: Rng>(
        &self,
        current: usize,
        candidates: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        let scores: Vec<f64> = candidates
            .iter()
            .map(|&c| self.desirability(current, c))
            .collect();
        let total: f64 = scores.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            // Degenerate pheromone state; fall back to a uniform pick.
            let index = rng.gen_range(0..candidates.len());
            return Some(candidates[index]);
        }

        let mut max_weight = f64::NEG_INFINITY;
        for &score in &scores {
            let weight = score / total;
            if weight > max_weight {
                max_weight = weight;
            }
        }

        let ties: Vec<usize> = candidates
            .iter()
            .zip(&scores)
            .filter(|&(_, &score)| (score / total - max_weight).abs() < 1e-12)
            .map(|(&c, _)| c)
            .collect();

        let index = rng.gen_range(0..ties.len());
        Some(ties[index])
    }

    fn desirability(&self, from: usize, to: usize) -> f64 {
        let tau = self.pheromones.get(from, to).powf(self.alpha);
        let eta = (1.0 / self.space.distance(from, to)).powf(self.beta);
        tau * eta
    }

    /// Length of a route closed over the depot arc.
    fn route_length(&self, route: &[usize]) -> f64 {
        let mut length = 0.0;
        for pair in route.windows(2) {
            length += self.space.distance(pair[0], pair[1]);
        }
        length + self.space.distance(*route.last().unwrap(), self.space.depot())
    }

    /// Coverage and reachability check run before any best-so-far update.
    fn route_is_valid(&self, route: &[usize]) -> bool {
        let sites = self.space.num_sites();
        let mut seen = vec![false; sites];

        for &site in route {
            if self.space.is_customer(site) {
                if seen[site] {
                    return false;
                }
                seen[site] = true;
            }
        }
        let covered = (0..sites)
            .filter(|&s| self.space.is_customer(s))
            .all(|s| seen[s]);

        covered
            && route
                .windows(2)
                .all(|pair| self.space.arc_exists(pair[0], pair[1]))
            && self
                .space
                .arc_exists(*route.last().unwrap(), self.space.depot())
    }

    /// One decay pass followed by reinforcement: every agent's route under
    /// the standard policies, only the best-so-far route (then a clamp into
    /// the max-min band) under the elitist policy.
    fn update_pheromones(&mut self, routes: &[(Vec<usize>, f64)]) {
        self.pheromones.decay(self.pheromone_decay);

        match self.policy {
            PheromonePolicy::Standard | PheromonePolicy::ChargingAware => {
                for (route, length) in routes {
                    let amount = self.q / length;
                    self.pheromones.reinforce_route(route, amount);
                    self.pheromones
                        .reinforce(*route.last().unwrap(), self.space.depot(), amount);
                }
            }
            PheromonePolicy::ElitistMaxMin => {
                if let Some(best) = self.best_route.clone() {
                    let amount = self.q / self.best_length;
                    self.pheromones.reinforce_route(&best, amount);
                    self.pheromones
                        .reinforce(*best.last().unwrap(), self.space.depot(), amount);

                    let (tau_min, tau_max) = self.max_min_bounds();
                    self.pheromones.clamp(tau_min, tau_max);
                }
            }
        }
    }

    /// MMAS-style trail limits derived from the best length and `p_best`.
    fn max_min_bounds(&self) -> (f64, f64) {
        let n = self.space.num_sites() as f64;
        let tau_max = self.q / ((1.0 - self.pheromone_decay) * self.best_length);
        let p = self.p_best.powf(1.0 / n);
        let tau_min = (tau_max * (1.0 - p)) / ((n / 2.0 - 1.0).max(1.0) * p);
        (tau_min.min(tau_max), tau_max)
    }
}
