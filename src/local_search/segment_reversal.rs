//! Pheromone-weighted random segment reversal.

use super::{LocalSearch, IMPROVEMENT_EPS};
use log::debug;
use rand::Rng;

impl LocalSearch {
    /// Randomized first-improvement reversal.
    ///
    /// Position pairs are drawn with probability proportional to a local
    /// pheromone table maintained over *positions* (not nodes), so pairs
    /// that paid off recently are tried again sooner. Each call makes up to
    /// `random_search_iterations` attempts, accepts the first reversal that
    /// shortens the route, reinforces the winning pair by the improvement,
    /// and decays the table once at the end.
    pub fn segment_reversal<R: Rng>(
        &mut self,
        route: &mut [usize],
        cost: &impl Fn(&[usize]) -> f64,
        rng: &mut R,
    ) {
        let n = route.len();
        if n < 3 {
            return;
        }
        self.ensure_segment_pheromone(n);

        let base = cost(route);
        for attempt in 0..self.random_search_iterations {
            let (x, y) = self.sample_segment(rng);

            route[x..=y].reverse();
            let candidate = cost(route);
            if candidate + IMPROVEMENT_EPS < base {
                debug!(
                    "segment reversal ({}, {}) accepted after {} attempts: {:.3} -> {:.3}",
                    x,
                    y,
                    attempt + 1,
                    base,
                    candidate
                );
                self.reinforce_segment(x, y, base - candidate);
                break;
            }
            route[x..=y].reverse();
        }

        self.decay_segment_pheromone();
    }
}
