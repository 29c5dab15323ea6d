//! Metaheuristic solvers for the electric vehicle routing problem.
//!
//! A problem instance pairs a depot and demand-carrying customers with
//! charging stations, a vehicle capacity and a battery budget. Solvers work
//! on customer permutations; [`solution::stitch_tour`] turns the winning
//! permutation into a drivable tour with reload returns and charging
//! detours.
//!
//! Three heuristics are available behind the [`EvrpSolver`] facade:
//! an ant colony over raw customers, an ant colony over a capacity-bounded
//! k-means decomposition, and a genetic algorithm seeded from the clustered
//! colony. All of them share the local search engine for refinement.
//!
//! # Example
//!
//! ```no_run
//! use evrp_aco::{Config, EvrpSolver, Heuristic, Node, NodeKind, Problem};
//!
//! let nodes = vec![
//!     Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot),
//!     Node::new(1, 1.0, 0.0, 3.0, NodeKind::Customer),
//!     Node::new(2, 2.0, 1.0, 2.0, NodeKind::Customer),
//!     Node::new(3, 1.0, 1.0, 0.0, NodeKind::ChargingStation),
//! ];
//! let problem = Problem::new("tiny".to_string(), nodes, 10.0, 50.0, 1.0, 1);
//! let config = Config::default().with_seed(42);
//!
//! let report = EvrpSolver::new(&problem, config).run().unwrap();
//! println!("{}: {:.2}", problem.name, report.length);
//! ```

pub mod ant_colony;
pub mod cluster;
pub mod config;
pub mod error;
pub mod genetic;
pub mod local_search;
pub mod pheromone;
pub mod problem;
pub mod solution;

pub use crate::config::{Config, Heuristic, PheromonePolicy};
pub use crate::error::SolverError;
pub use crate::problem::{Node, NodeKind, Problem};
pub use crate::solution::Tour;

use crate::ant_colony::{AntColony, CustomerSpace};
use crate::cluster::{cluster_customers, ClusterSpace};
use crate::genetic::GeneticAlgorithm;
use crate::local_search::{lin_kernighan::lin_kernighan, LocalSearch};
use crate::solution::{closed_length, stitch_tour, validate_route, validate_tour};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// The outcome of one solver run.
#[derive(Debug, Clone, Serialize)]
pub struct SolverReport {
    /// The winning customer permutation.
    pub route: Vec<usize>,
    /// The stitched, constraint-respecting tour.
    pub tour: Tour,
    /// Length of the stitched tour.
    pub length: f64,
    /// Fitness evaluations consumed by the run.
    pub evals: f64,
}

/// Facade running the configured heuristic end to end: construction,
/// refinement, stitching and validation.
pub struct EvrpSolver<'a> {
    problem: &'a Problem,
    config: Config,
}

impl<'a> EvrpSolver<'a> {
    pub fn new(problem: &'a Problem, config: Config) -> Self {
        EvrpSolver { problem, config }
    }

    /// Run the configured heuristic and return the validated result.
    ///
    /// The evaluation counter is reset at the start, so the report's `evals`
    /// covers exactly this run.
    pub fn run(&self) -> Result<SolverReport, SolverError> {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.problem.reset_evals();

        let mut route = match self.config.heuristic {
            Heuristic::AntColony => self.run_ant_colony(&mut rng)?,
            Heuristic::ClusteredAntColony => self.run_clustered(&mut rng)?,
            Heuristic::Genetic => self.run_genetic(&mut rng)?,
        };

        // Post-construction polish on the customer permutation.
        let problem = self.problem;
        let cost = |r: &[usize]| closed_length(problem, r);
        let mut search = LocalSearch::new(
            self.config.random_search_iterations,
            self.config.two_opt_iterations,
        );
        search.refine(&mut route, &cost, &mut rng);
        lin_kernighan(self.problem, &mut route);

        validate_route(self.problem, &route)?;
        let tour = stitch_tour(self.problem, &route)?;
        validate_tour(self.problem, &tour.nodes)?;

        info!(
            "{}: {:?} finished, tour length {:.3}, {:.1} evaluations",
            self.problem.name,
            self.config.heuristic,
            tour.length,
            self.problem.evals()
        );

        Ok(SolverReport {
            route,
            length: tour.length,
            evals: self.problem.evals(),
            tour,
        })
    }

    fn run_ant_colony<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>, SolverError> {
        let space = CustomerSpace::new(self.problem);
        let mut colony = AntColony::new(&space, &self.config, rng);
        colony.optimize(self.config.iterations, rng)?;

        let route = match colony.best_route() {
            Some(route) => route.to_vec(),
            None => colony.build_route(rng)?,
        };
        // Stations and the depot are stitching concerns; keep customers only.
        Ok(route
            .into_iter()
            .filter(|&node| {
                node != self.problem.depot && !self.problem.is_charging_station(node)
            })
            .collect())
    }

    fn run_clustered<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>, SolverError> {
        let cluster_count = self
            .config
            .cluster_count
            .unwrap_or_else(|| self.problem.min_vehicles.max(1));
        let clusters = cluster_customers(self.problem, cluster_count)?;
        let space = ClusterSpace::new(self.problem, clusters);

        let mut colony = AntColony::new(&space, &self.config, rng);
        colony.optimize(self.config.iterations, rng)?;

        let cluster_route = match colony.best_route() {
            Some(route) => route.to_vec(),
            None => colony.build_route(rng)?,
        };
        Ok(space.expand_route(self.problem, &cluster_route))
    }

    fn run_genetic<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>, SolverError> {
        let mut algorithm = GeneticAlgorithm::new(self.problem, &self.config);
        algorithm.run_generations(self.config.generations, rng)?;
        let (route, _) = algorithm
            .best()
            .ok_or(SolverError::InfeasibleConstruction { attempts: 0 })?;
        Ok(route.to_vec())
    }
}
