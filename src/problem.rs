//! Problem definition and the distance oracle for the EVRP.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::f64;

/// The role a node plays in the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Depot,
    Customer,
    ChargingStation,
}

/// Represents a node (depot, customer or charging station) in the EVRP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
    pub kind: NodeKind,
}

impl Node {
    /// Create a new node. Depots and charging stations carry no demand.
    pub fn new(id: usize, x: f64, y: f64, demand: f64, kind: NodeKind) -> Self {
        let demand = match kind {
            NodeKind::Customer => demand,
            _ => 0.0,
        };
        Node {
            id,
            x,
            y,
            demand,
            kind,
        }
    }

    /// Calculate the Euclidean distance between two nodes.
    pub fn distance(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Represents an EVRP problem instance and serves as the distance oracle
/// consumed by every solver component.
///
/// Distance lookups and full route evaluations are counted towards the
/// cumulative fitness-evaluation budget: a whole-route evaluation counts 1,
/// a single arc lookup counts `1 / node_count` (a partial evaluation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub nodes: Vec<Node>,
    pub depot: usize,
    pub vehicle_capacity: f64,
    pub battery_capacity: f64,
    /// Energy consumed per unit of distance travelled.
    pub energy_rate: f64,
    /// Minimum vehicle count from the instance; default cluster count.
    pub min_vehicles: usize,
    #[serde(skip)]
    distance_matrix: Vec<Vec<f64>>,
    #[serde(skip)]
    evals: Cell<f64>,
}

impl Problem {
    /// Create a new problem instance and precompute its distance matrix.
    pub fn new(
        name: String,
        nodes: Vec<Node>,
        vehicle_capacity: f64,
        battery_capacity: f64,
        energy_rate: f64,
        min_vehicles: usize,
    ) -> Self {
        let depot = nodes
            .iter()
            .position(|n| n.kind == NodeKind::Depot)
            .unwrap_or(0);
        let distance_matrix = Self::compute_distance_matrix(&nodes);

        Problem {
            name,
            nodes,
            depot,
            vehicle_capacity,
            battery_capacity,
            energy_rate,
            min_vehicles,
            distance_matrix,
            evals: Cell::new(0.0),
        }
    }

    /// Rebuild the derived state after deserialization.
    pub fn rebuild(&mut self) {
        self.distance_matrix = Self::compute_distance_matrix(&self.nodes);
        self.evals = Cell::new(0.0);
    }

    fn compute_distance_matrix(nodes: &[Node]) -> Vec<Vec<f64>> {
        let n = nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    matrix[i][j] = nodes[i].distance(&nodes[j]);
                }
            }
        }

        matrix
    }

    /// Distance between two node indices. `f64::INFINITY` marks a blocked arc.
    ///
    /// Counts a partial fitness evaluation proportional to the problem size.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.evals
            .set(self.evals.get() + 1.0 / self.nodes.len() as f64);
        self.distance_matrix[from][to]
    }

    /// Energy consumed when travelling between two nodes.
    pub fn energy(&self, from: usize, to: usize) -> f64 {
        self.energy_rate * self.distance_matrix[from][to]
    }

    /// Demand of a node (zero for the depot and charging stations).
    pub fn demand(&self, node: usize) -> f64 {
        self.nodes[node].demand
    }

    /// Whether the node recharges a vehicle's battery. The depot does.
    pub fn is_charging_station(&self, node: usize) -> bool {
        matches!(
            self.nodes[node].kind,
            NodeKind::ChargingStation | NodeKind::Depot
        )
    }

    /// Ids of all customers, in node order.
    pub fn customers(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Customer)
            .map(|n| n.id)
            .collect()
    }

    /// Ids of all charging stations (excluding the depot).
    pub fn stations(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::ChargingStation)
            .map(|n| n.id)
            .collect()
    }

    /// Number of customers (excluding the depot and stations).
    pub fn customer_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Customer)
            .count()
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Evaluate the length of a full node sequence.
    ///
    /// Counts one whole fitness evaluation.
    pub fn fitness_evaluation(&self, route: &[usize]) -> f64 {
        let mut length = 0.0;
        for i in 0..route.len().saturating_sub(1) {
            length += self.distance_matrix[route[i]][route[i + 1]];
        }
        self.evals.set(self.evals.get() + 1.0);
        length
    }

    /// Cumulative fitness-evaluation count, for compute-budget accounting.
    pub fn evals(&self) -> f64 {
        self.evals.get()
    }

    /// Reset the evaluation counter for a new independent run.
    pub fn reset_evals(&self) {
        self.evals.set(0.0);
    }
}
