//! Tests for route validation and tour stitching.

use evrp_aco::solution::{closed_length, stitch_tour, validate_route, validate_tour};
use evrp_aco::{Node, NodeKind, Problem};

fn capacity_problem() -> Problem {
    // Two customers whose combined demand exceeds one vehicle load.
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot),
        Node::new(1, 1.0, 0.0, 2.0, NodeKind::Customer),
        Node::new(2, 2.0, 0.0, 2.0, NodeKind::Customer),
    ];
    Problem::new("capacity".to_string(), nodes, 3.0, 1e6, 1.0, 2)
}

fn battery_problem() -> Problem {
    // One customer beyond round-trip battery range; a station on the way back.
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot),
        Node::new(1, 4.0, 0.0, 1.0, NodeKind::Customer),
        Node::new(2, 2.0, 0.0, 0.0, NodeKind::ChargingStation),
    ];
    Problem::new("battery".to_string(), nodes, 10.0, 6.0, 1.0, 1)
}

#[test]
fn stitching_returns_to_the_depot_to_reload() {
    let problem = capacity_problem();
    let tour = stitch_tour(&problem, &[1, 2]).unwrap();

    assert_eq!(tour.nodes, vec![0, 1, 0, 2, 0]);
    assert!((tour.length - 6.0).abs() < 1e-9);
}

#[test]
fn stitching_detours_to_a_charging_station() {
    let problem = battery_problem();
    let tour = stitch_tour(&problem, &[1]).unwrap();

    // Out directly, back through the station.
    assert_eq!(tour.nodes, vec![0, 1, 2, 0]);
    assert!((tour.length - 8.0).abs() < 1e-9);
}

#[test]
fn stitching_fails_without_a_reachable_station() {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot),
        Node::new(1, 4.0, 0.0, 1.0, NodeKind::Customer),
    ];
    let problem = Problem::new("stranded".to_string(), nodes, 10.0, 6.0, 1.0, 1);

    assert!(stitch_tour(&problem, &[1]).is_err());
}

#[test]
fn stitched_tours_pass_validation() {
    let problem = capacity_problem();
    let tour = stitch_tour(&problem, &[1, 2]).unwrap();
    assert!(validate_tour(&problem, &tour.nodes).is_ok());

    let problem = battery_problem();
    let tour = stitch_tour(&problem, &[1]).unwrap();
    assert!(validate_tour(&problem, &tour.nodes).is_ok());
}

#[test]
fn validation_rejects_capacity_violations() {
    let problem = capacity_problem();
    // Serving both customers without reloading busts the load.
    assert!(validate_tour(&problem, &[0, 1, 2, 0]).is_err());
}

#[test]
fn validation_rejects_double_visits_and_omissions() {
    let problem = capacity_problem();
    assert!(validate_tour(&problem, &[0, 1, 0, 1, 0]).is_err());
    assert!(validate_tour(&problem, &[0, 1, 0]).is_err());
}

#[test]
fn validation_requires_depot_endpoints() {
    let problem = capacity_problem();
    assert!(validate_tour(&problem, &[1, 0, 2, 0]).is_err());
}

#[test]
fn route_validation_enforces_the_permutation_invariant() {
    let problem = capacity_problem();
    assert!(validate_route(&problem, &[1, 2]).is_ok());
    assert!(validate_route(&problem, &[2, 1]).is_ok());
    assert!(validate_route(&problem, &[1, 1]).is_err());
    assert!(validate_route(&problem, &[1]).is_err());
    assert!(validate_route(&problem, &[1, 2, 0]).is_err());
}

#[test]
fn closed_length_wraps_over_the_depot() {
    let problem = capacity_problem();
    // depot -> 1 -> 2 -> depot = 1 + 1 + 2
    assert!((closed_length(&problem, &[1, 2]) - 4.0).abs() < 1e-9);
}
