//! End-to-end tests for the solver facade.

use evrp_aco::solution::validate_tour;
use evrp_aco::{Config, EvrpSolver, Node, NodeKind, Problem};

/// Twelve customers in a grid with a central depot, two charging stations
/// and a capacity that forces several sub-tours.
fn grid_problem() -> Problem {
    let mut nodes = vec![Node::new(0, 15.0, 15.0, 0.0, NodeKind::Depot)];

    let mut id = 1;
    for i in 0..3 {
        for j in 0..4 {
            let x = i as f64 * 10.0 + 5.0;
            let y = j as f64 * 8.0 + 3.0;
            let demand = 1.0 + (id % 3) as f64;
            nodes.push(Node::new(id, x, y, demand, NodeKind::Customer));
            id += 1;
        }
    }

    nodes.push(Node::new(id, 5.0, 15.0, 0.0, NodeKind::ChargingStation));
    nodes.push(Node::new(id + 1, 25.0, 15.0, 0.0, NodeKind::ChargingStation));

    Problem::new("grid".to_string(), nodes, 8.0, 200.0, 1.0, 3)
}

fn check_report(problem: &Problem, config: Config) {
    let report = EvrpSolver::new(problem, config).run().unwrap();

    assert!(report.length > 0.0);
    assert!(report.length.is_finite());
    assert!(report.evals > 0.0);

    let mut route = report.route.clone();
    route.sort_unstable();
    assert_eq!(route, problem.customers());

    assert!((report.tour.length - report.length).abs() < 1e-9);
    assert!(validate_tour(problem, &report.tour.nodes).is_ok());
}

#[test]
fn ant_colony_solves_the_grid() {
    let problem = grid_problem();
    check_report(&problem, Config::aco_preset().with_seed(1));
}

#[test]
fn max_min_ant_colony_solves_the_grid() {
    let problem = grid_problem();
    check_report(&problem, Config::max_min_preset().with_seed(2));
}

#[test]
fn clustered_ant_colony_solves_the_grid() {
    let problem = grid_problem();
    let config = Config::clustered_preset()
        .with_iterations(50)
        .with_seed(3);
    check_report(&problem, config);
}

#[test]
fn genetic_algorithm_solves_the_grid() {
    let problem = grid_problem();
    check_report(&problem, Config::genetic_preset().with_seed(4));
}

#[test]
fn clustered_solver_survives_a_starved_cluster() {
    // Identical customer coordinates collapse both k-means seeds; the
    // starved cluster must not reach the colony as an unreachable site.
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot),
        Node::new(1, 1.0, 1.0, 1.0, NodeKind::Customer),
        Node::new(2, 1.0, 1.0, 1.0, NodeKind::Customer),
        Node::new(3, 1.0, 1.0, 1.0, NodeKind::Customer),
    ];
    let problem = Problem::new("stacked".to_string(), nodes, 100.0, 1e6, 1.0, 2);

    let config = Config::clustered_preset()
        .with_iterations(10)
        .with_cluster_count(2)
        .with_seed(6);
    check_report(&problem, config);
}

#[test]
fn seeded_solves_are_reproducible() {
    let problem = grid_problem();

    let first = EvrpSolver::new(&problem, Config::aco_preset().with_seed(77))
        .run()
        .unwrap();
    let second = EvrpSolver::new(&problem, Config::aco_preset().with_seed(77))
        .run()
        .unwrap();

    assert_eq!(first.route, second.route);
    assert_eq!(first.tour.nodes, second.tour.nodes);
    assert_eq!(first.length, second.length);
}

#[test]
fn evaluation_counter_covers_exactly_one_run() {
    let problem = grid_problem();
    let solver = EvrpSolver::new(&problem, Config::aco_preset().with_seed(9));

    let first = solver.run().unwrap();
    let second = solver.run().unwrap();

    // The counter resets per run, so both runs report the same budget.
    assert_eq!(first.evals, second.evals);
}
