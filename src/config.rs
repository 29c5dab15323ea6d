//! Configuration parameters for the EVRP metaheuristics.

use serde::{Deserialize, Serialize};

/// Pheromone-update policy of the ant colony constructor.
///
/// The three variants share one construction state machine and differ only
/// in what is optimized: `Standard` scores the plain customer order,
/// `ChargingAware` admits charging stations mid-construction and scores the
/// full traversed route, `ElitistMaxMin` clamps pheromones into
/// `[tau_min, tau_max]` and reinforces only the best route found so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PheromonePolicy {
    Standard,
    ChargingAware,
    ElitistMaxMin,
}

/// Which solver the facade runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// Ant colony over raw customers.
    AntColony,
    /// K-means decomposition, then ant colony over clusters.
    ClusteredAntColony,
    /// Genetic algorithm seeded by clustered ant colony construction.
    Genetic,
}

/// Configuration settings for the EVRP solvers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which solver to run.
    pub heuristic: Heuristic,
    /// Pheromone-update policy for ant colony construction.
    pub policy: PheromonePolicy,
    /// Number of route-constructing agents per iteration.
    pub num_ants: usize,
    /// Number of outer ant colony iterations.
    pub iterations: usize,
    /// Multiplicative pheromone decay factor, in (0, 1).
    pub pheromone_decay: f64,
    /// Reinforcement constant: an agent deposits `q / route_length`.
    pub q: f64,
    /// Pheromone exponent in the desirability heuristic.
    pub alpha: f64,
    /// Inverse-distance exponent in the desirability heuristic.
    pub beta: f64,
    /// Tie-probability parameter for the max-min pheromone bounds.
    pub p_best: f64,
    /// Construction restarts per agent before giving up on an iteration.
    pub construction_retries: usize,
    /// Stagnant-pass budget for the complete 2-opt search.
    pub two_opt_iterations: usize,
    /// Attempt budget for the pheromone-weighted segment reversal.
    pub random_search_iterations: usize,
    /// Number of clusters for the k-means decomposition; `None` uses the
    /// instance's minimum vehicle count.
    pub cluster_count: Option<usize>,
    /// Number of parent routes in the genetic layer.
    pub population_size: usize,
    /// Number of generations to evolve.
    pub generations: usize,
    /// A child mutates with probability `1 / mutation_probability`.
    pub mutation_probability: usize,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            heuristic: Heuristic::AntColony,
            policy: PheromonePolicy::Standard,
            num_ants: 4,
            iterations: 50,
            pheromone_decay: 0.5,
            q: 1.0,
            alpha: 0.5,
            beta: 2.0,
            p_best: 0.05,
            construction_retries: 50,
            two_opt_iterations: 3,
            random_search_iterations: 3,
            cluster_count: None,
            population_size: 10,
            generations: 20,
            mutation_probability: 4,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Parameters of the plain ant colony reference runs.
    pub fn aco_preset() -> Self {
        Config::default()
    }

    /// Parameters of the cluster-scale ant colony reference runs.
    pub fn clustered_preset() -> Self {
        Config {
            heuristic: Heuristic::ClusteredAntColony,
            num_ants: 8,
            iterations: 500,
            pheromone_decay: 0.98,
            alpha: 0.6,
            beta: 0.6,
            ..Config::default()
        }
    }

    /// Parameters of the charging-aware ant colony reference runs.
    pub fn charging_preset() -> Self {
        Config {
            policy: PheromonePolicy::ChargingAware,
            num_ants: 4,
            iterations: 25,
            pheromone_decay: 0.8,
            q: 80.0,
            alpha: 0.8,
            beta: 0.8,
            ..Config::default()
        }
    }

    /// Parameters of the max-min ant colony reference runs.
    pub fn max_min_preset() -> Self {
        Config {
            policy: PheromonePolicy::ElitistMaxMin,
            num_ants: 3,
            iterations: 50,
            pheromone_decay: 0.98,
            alpha: 0.6,
            beta: 0.6,
            p_best: 0.05,
            ..Config::default()
        }
    }

    /// Parameters of the genetic algorithm reference runs. Construction
    /// parameters are kept cheap; the population does the heavy lifting.
    pub fn genetic_preset() -> Self {
        Config {
            heuristic: Heuristic::Genetic,
            num_ants: 3,
            iterations: 5,
            pheromone_decay: 0.9,
            alpha: 0.6,
            beta: 2.1,
            cluster_count: Some(4),
            ..Config::default()
        }
    }

    /// Set the solver to run.
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Set the pheromone-update policy.
    pub fn with_policy(mut self, policy: PheromonePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of agents.
    pub fn with_num_ants(mut self, ants: usize) -> Self {
        self.num_ants = ants;
        self
    }

    /// Set the number of outer iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the pheromone decay factor.
    pub fn with_pheromone_decay(mut self, decay: f64) -> Self {
        self.pheromone_decay = decay;
        self
    }

    /// Set the reinforcement constant Q.
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Set the desirability exponents.
    pub fn with_exponents(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Set the local search iteration budgets.
    pub fn with_search_budgets(mut self, random_search: usize, two_opt: usize) -> Self {
        self.random_search_iterations = random_search;
        self.two_opt_iterations = two_opt;
        self
    }

    /// Set the cluster count.
    pub fn with_cluster_count(mut self, clusters: usize) -> Self {
        self.cluster_count = Some(clusters);
        self
    }

    /// Set the genetic population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set the inverse mutation probability.
    pub fn with_mutation_probability(mut self, probability: usize) -> Self {
        self.mutation_probability = probability;
        self
    }

    /// Set the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_select_their_policy() {
        assert_eq!(Config::aco_preset().policy, PheromonePolicy::Standard);
        assert_eq!(
            Config::charging_preset().policy,
            PheromonePolicy::ChargingAware
        );
        assert_eq!(
            Config::max_min_preset().policy,
            PheromonePolicy::ElitistMaxMin
        );
        assert_eq!(Config::genetic_preset().heuristic, Heuristic::Genetic);
    }

    #[test]
    fn charging_preset_carries_the_reference_parameters() {
        let config = Config::charging_preset();
        assert_eq!(config.num_ants, 4);
        assert_eq!(config.iterations, 25);
        assert!((config.pheromone_decay - 0.8).abs() < 1e-12);
        assert!((config.q - 80.0).abs() < 1e-12);
        assert!((config.alpha - 0.8).abs() < 1e-12);
        assert!((config.beta - 0.8).abs() < 1e-12);
    }
}
