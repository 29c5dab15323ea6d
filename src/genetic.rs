//! Population evolution over customer permutations.

use crate::ant_colony::AntColony;
use crate::cluster::{cluster_customers, ClusterSpace};
use crate::config::Config;
use crate::error::SolverError;
use crate::local_search::LocalSearch;
use crate::problem::Problem;
use crate::solution::{closed_length, validate_route};
use log::{debug, info, warn};
use rand::Rng;

/// Genetic algorithm over customer permutations, seeded by cluster-scale
/// ant colony construction.
///
/// Every generation crosses the current best parent with each of the
/// others (both orientations, so up to `2 * (population - 1)` children),
/// mutates children by local search refinement, and advances the shortest
/// `population_size` children as the next parents. The best route ever seen
/// is kept in a separate validated record, so it is monotone even though
/// the population itself turns over completely.
pub struct GeneticAlgorithm<'a> {
    problem: &'a Problem,
    config: Config,
    local_search: LocalSearch,
    /// Customer permutations, kept sorted by ascending closed length.
    population: Vec<Vec<usize>>,
    best_route: Option<Vec<usize>>,
    best_length: f64,
    generation_history: Vec<f64>,
}

impl<'a> GeneticAlgorithm<'a> {
    pub fn new(problem: &'a Problem, config: &Config) -> Self {
        GeneticAlgorithm {
            problem,
            config: config.clone(),
            local_search: LocalSearch::new(
                config.random_search_iterations,
                config.two_opt_iterations,
            ),
            population: Vec::new(),
            best_route: None,
            best_length: f64::INFINITY,
            generation_history: Vec::new(),
        }
    }

    /// Seed the population: train one cluster-scale ant colony, then draw
    /// and refine `population_size` routes from its pheromone state.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) -> Result<(), SolverError> {
        let cluster_count = self
            .config
            .cluster_count
            .unwrap_or_else(|| self.problem.min_vehicles.max(1));
        let clusters = cluster_customers(self.problem, cluster_count)?;
        let space = ClusterSpace::new(self.problem, clusters);

        let mut colony = AntColony::new(&space, &self.config, rng);
        colony.optimize(self.config.iterations, rng)?;

        let problem = self.problem;
        let cost = |route: &[usize]| closed_length(problem, route);

        self.population.clear();
        for _ in 0..self.config.population_size {
            let cluster_route = colony.build_route(rng)?;
            let mut route = space.expand_route(self.problem, &cluster_route);
            self.local_search.refine(&mut route, &cost, rng);
            self.population.push(route);
        }
        self.sort_population();
        self.record_best();

        info!(
            "seeded population of {} from {} clusters, best {:.3}",
            self.population.len(),
            cluster_count,
            self.best_length
        );
        Ok(())
    }

    /// Run `generations` rounds of crossover, mutation and selection,
    /// initializing the population first if needed.
    pub fn run_generations<R: Rng>(
        &mut self,
        generations: usize,
        rng: &mut R,
    ) -> Result<(), SolverError> {
        if self.population.is_empty() {
            self.initialize(rng)?;
        }

        for generation in 1..=generations {
            self.step(rng);
            self.record_best();
            let best = self.population_best_length();
            self.generation_history.push(best);
            debug!("generation {}: best parent {:.3}", generation, best);
        }
        Ok(())
    }

    /// One generation: crossover, mutation, truncation selection over the
    /// child buffer. Parents survive only when too few children exist to
    /// fill the next generation.
    fn step<R: Rng>(&mut self, rng: &mut R) {
        if self.population.is_empty() {
            return;
        }
        let problem = self.problem;
        let cost = |route: &[usize]| closed_length(problem, route);

        let mut children = Vec::with_capacity(2 * self.population.len());
        for other in &self.population[1..] {
            children.push(pmx_crossover(&self.population[0], other, rng));
            children.push(pmx_crossover(other, &self.population[0], rng));
        }

        for child in &mut children {
            if rng.gen_range(0..self.config.mutation_probability.max(1)) == 0 {
                self.local_search.refine(child, &cost, rng);
            }
        }

        if children.len() >= self.config.population_size {
            self.population = children;
        } else {
            // Degenerate population sizes; pad with the surviving parents.
            children.append(&mut self.population);
            self.population = children;
        }
        self.sort_population();
        self.population.truncate(self.config.population_size);
    }

    /// The shortest valid route ever seen with its closed length.
    pub fn best(&self) -> Option<(&[usize], f64)> {
        self.best_route
            .as_deref()
            .map(|route| (route, self.best_length))
    }

    /// Best parent length recorded after each generation.
    pub fn generation_history(&self) -> &[f64] {
        &self.generation_history
    }

    fn population_best_length(&self) -> f64 {
        self.population
            .first()
            .map(|route| closed_length(self.problem, route))
            .unwrap_or(f64::INFINITY)
    }

    /// Fold the current population leader into the best-so-far record,
    /// guarded by route validation.
    fn record_best(&mut self) {
        if let Some(route) = self.population.first() {
            let length = closed_length(self.problem, route);
            if length < self.best_length {
                match validate_route(self.problem, route) {
                    Ok(()) => {
                        self.best_length = length;
                        self.best_route = Some(route.clone());
                    }
                    Err(error) => warn!("discarding invalid population leader: {}", error),
                }
            }
        }
    }

    /// Sort ascending by closed length, evaluating each route exactly once.
    fn sort_population(&mut self) {
        let problem = self.problem;
        let mut scored: Vec<(f64, Vec<usize>)> = std::mem::take(&mut self.population)
            .into_iter()
            .map(|route| (closed_length(problem, &route), route))
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        self.population
            .extend(scored.into_iter().map(|(_, route)| route));
    }
}

/// Partially mapped crossover of two permutations.
///
/// A random segment of `first` is copied into the child; the rest is filled
/// from `second`, following the mapping chain for values the segment
/// displaced. The result is always a permutation of the parents' values.
pub fn pmx_crossover<R: Rng>(first: &[usize], second: &[usize], rng: &mut R) -> Vec<usize> {
    let n = first.len();
    if n < 2 {
        return first.to_vec();
    }

    let mut cut_a = rng.gen_range(0..n);
    let mut cut_b = rng.gen_range(0..n);
    if cut_a > cut_b {
        std::mem::swap(&mut cut_a, &mut cut_b);
    }

    let mut child = vec![usize::MAX; n];
    child[cut_a..=cut_b].copy_from_slice(&first[cut_a..=cut_b]);

    for i in cut_a..=cut_b {
        let value = second[i];
        if child[cut_a..=cut_b].contains(&value) {
            continue;
        }
        // Chase the mapping chain until an open slot appears.
        let mut position = i;
        loop {
            let displaced = first[position];
            position = second
                .iter()
                .position(|&v| v == displaced)
                .expect("parents must share one value set");
            if child[position] == usize::MAX {
                break;
            }
        }
        child[position] = value;
    }

    for i in 0..n {
        if child[i] == usize::MAX {
            child[i] = second[i];
        }
    }
    child
}
