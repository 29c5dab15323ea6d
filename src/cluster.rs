//! Capacity-bounded k-means decomposition of the customer set.

use crate::ant_colony::SearchSpace;
use crate::error::SolverError;
use crate::problem::Problem;
use itertools::Itertools;
use log::debug;
use std::f64;

/// A subset of customers assigned to one centroid.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub customers: Vec<usize>,
    pub demand: f64,
}

impl Cluster {
    fn new() -> Self {
        Cluster {
            customers: Vec::new(),
            demand: 0.0,
        }
    }
}

/// Partition the customers into `cluster_count` capacity-bounded clusters.
///
/// Centroids are seeded at evenly spaced positions along the customer index
/// order, so the decomposition is deterministic for a given instance. Each
/// assignment pass sends a customer to the nearest centroid whose cluster
/// demand has not yet exceeded the vehicle capacity; centroids are recomputed
/// as the midpoint of their member bounding box. The loop stops after two
/// consecutive iterations without centroid movement, followed by one final
/// assignment pass. Coincident seeds can starve a centroid; clusters left
/// empty by the final pass are dropped rather than carried as uncoverable
/// sites. Cluster 0 is the cluster nearest the depot.
pub fn cluster_customers(
    problem: &Problem,
    cluster_count: usize,
) -> Result<Vec<Cluster>, SolverError> {
    let customers = problem.customers();
    if cluster_count == 0 || cluster_count > customers.len() {
        return Err(SolverError::ClusteringInfeasible {
            customer: 0,
            clusters: cluster_count,
        });
    }

    let mut centroids = seed_centroids(problem, &customers, cluster_count);
    let mut clusters;

    let mut stable_passes = 0;
    while stable_passes < 2 {
        clusters = assign_customers(problem, &customers, &centroids)?;
        if recompute_centroids(problem, &clusters, &mut centroids) {
            stable_passes = 0;
        }
        stable_passes += 1;
    }
    clusters = assign_customers(problem, &customers, &centroids)?;
    clusters.retain(|cluster| !cluster.customers.is_empty());

    // Routing convention: start the cluster sequence next to the depot.
    let nearest = nearest_cluster_to_depot(problem, &clusters);
    clusters.swap(0, nearest);

    debug!(
        "clustered {} customers into {} clusters",
        customers.len(),
        clusters.len()
    );
    Ok(clusters)
}

/// Evenly spaced deterministic seeding along the customer index order.
fn seed_centroids(
    problem: &Problem,
    customers: &[usize],
    cluster_count: usize,
) -> Vec<(f64, f64)> {
    let spacing = customers.len() / cluster_count;
    (0..cluster_count)
        .map(|i| {
            let node = &problem.nodes[customers[spacing * (i + 1) - 1]];
            (node.x, node.y)
        })
        .collect()
}

fn assign_customers(
    problem: &Problem,
    customers: &[usize],
    centroids: &[(f64, f64)],
) -> Result<Vec<Cluster>, SolverError> {
    let mut clusters: Vec<Cluster> = (0..centroids.len()).map(|_| Cluster::new()).collect();

    for &customer in customers {
        let node = &problem.nodes[customer];
        let mut best: Option<usize> = None;
        let mut best_distance = f64::INFINITY;

        for (index, &(cx, cy)) in centroids.iter().enumerate() {
            if clusters[index].demand > problem.vehicle_capacity {
                continue;
            }
            let distance = ((node.x - cx).powi(2) + (node.y - cy).powi(2)).sqrt();
            if distance < best_distance {
                best_distance = distance;
                best = Some(index);
            }
        }

        match best {
            Some(index) => {
                clusters[index].customers.push(customer);
                clusters[index].demand += problem.demand(customer);
            }
            None => {
                return Err(SolverError::ClusteringInfeasible {
                    customer,
                    clusters: centroids.len(),
                })
            }
        }
    }

    Ok(clusters)
}

/// Move each centroid to the midpoint of its cluster's bounding box.
/// Returns whether any centroid moved. Empty clusters keep their centroid.
fn recompute_centroids(
    problem: &Problem,
    clusters: &[Cluster],
    centroids: &mut [(f64, f64)],
) -> bool {
    let mut moved = false;

    for (index, cluster) in clusters.iter().enumerate() {
        if cluster.customers.is_empty() {
            continue;
        }

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for &customer in &cluster.customers {
            let node = &problem.nodes[customer];
            min_x = min_x.min(node.x);
            max_x = max_x.max(node.x);
            min_y = min_y.min(node.y);
            max_y = max_y.max(node.y);
        }

        let midpoint = (
            min_x + (max_x - min_x) * 0.5,
            min_y + (max_y - min_y) * 0.5,
        );
        if centroids[index] != midpoint {
            moved = true;
        }
        centroids[index] = midpoint;
    }

    moved
}

fn nearest_cluster_to_depot(problem: &Problem, clusters: &[Cluster]) -> usize {
    let depot = problem.depot;
    let mut nearest = 0;
    let mut nearest_distance = f64::INFINITY;

    for (index, cluster) in clusters.iter().enumerate() {
        for &customer in &cluster.customers {
            let distance = problem.distance(depot, customer);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = index;
            }
        }
    }

    nearest
}

/// The cluster-scale search space: sites are clusters, inter-cluster
/// distance is the closest member pair, and site 0 doubles as the start of
/// every cluster route.
pub struct ClusterSpace {
    clusters: Vec<Cluster>,
    distances: Vec<Vec<f64>>,
}

impl ClusterSpace {
    pub fn new(problem: &Problem, clusters: Vec<Cluster>) -> Self {
        let k = clusters.len();
        let mut distances = vec![vec![0.0; k]; k];

        for i in 0..k {
            for j in i + 1..k {
                let mut closest = f64::INFINITY;
                for &a in &clusters[i].customers {
                    for &b in &clusters[j].customers {
                        closest = closest.min(problem.distance(a, b));
                    }
                }
                distances[i][j] = closest;
                distances[j][i] = closest;
            }
        }

        ClusterSpace {
            clusters,
            distances,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Expand a cluster permutation into a customer permutation.
    ///
    /// Clusters are flattened in route order; inside each cluster the
    /// members are chained by nearest neighbor from the previously emitted
    /// node, starting from the depot.
    pub fn expand_route(&self, problem: &Problem, cluster_route: &[usize]) -> Vec<usize> {
        let mut route = Vec::new();
        let mut current = problem.depot;

        for &cluster in cluster_route {
            let mut remaining = self.clusters[cluster].customers.clone();
            while let Some(pos) = remaining.iter().position_min_by(|&&a, &&b| {
                problem
                    .distance(current, a)
                    .partial_cmp(&problem.distance(current, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }) {
                current = remaining.swap_remove(pos);
                route.push(current);
            }
        }

        route
    }
}

impl SearchSpace for ClusterSpace {
    fn num_sites(&self) -> usize {
        self.clusters.len()
    }

    fn depot(&self) -> usize {
        0
    }

    fn is_customer(&self, site: usize) -> bool {
        site != 0
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        self.distances[a][b]
    }
}
