//! Error taxonomy for the EVRP solvers.

use thiserror::Error;

/// Errors surfaced by the solver components.
///
/// Recoverable anomalies (a deadlocked construction attempt, a non-improving
/// local search move) are retried or discarded by the responsible component
/// and never show up here; these variants are the failures a caller has to
/// deal with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// No agent could complete a valid route within the retry budget.
    /// The caller should relax constraints or retry with fresh pheromones.
    #[error("no valid route could be constructed within {attempts} attempts")]
    InfeasibleConstruction { attempts: usize },

    /// Every cluster was at capacity before all customers were assigned.
    /// Fatal to the run; the capacity is too tight for the cluster count.
    #[error("customer {customer} cannot be assigned: all {clusters} clusters are at capacity")]
    ClusteringInfeasible { customer: usize, clusters: usize },

    /// A reconnection produced a route of the wrong shape. This indicates an
    /// internal invariant violation; candidates are discarded, not applied.
    #[error("route has invalid shape: expected {expected} customers, found {found}")]
    InvalidRouteShape { expected: usize, found: usize },
}
