//! Integration tests for the local search engine on problem instances.

use evrp_aco::local_search::{lin_kernighan::lin_kernighan, LocalSearch};
use evrp_aco::solution::closed_length;
use evrp_aco::{Node, NodeKind, Problem};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Eight customers on a ring around the depot; perimeter order is optimal.
fn ring_problem() -> Problem {
    let mut nodes = vec![Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot)];
    let coords = [
        (3.0, 0.0),
        (2.1, 2.1),
        (0.0, 3.0),
        (-2.1, 2.1),
        (-3.0, 0.0),
        (-2.1, -2.1),
        (0.0, -3.0),
        (2.1, -2.1),
    ];
    for (i, &(x, y)) in coords.iter().enumerate() {
        nodes.push(Node::new(i + 1, x, y, 1.0, NodeKind::Customer));
    }
    Problem::new("ring".to_string(), nodes, 100.0, 1e6, 1.0, 1)
}

fn is_permutation_of(route: &[usize], problem: &Problem) -> bool {
    let mut sorted = route.to_vec();
    sorted.sort_unstable();
    sorted == problem.customers()
}

#[test]
fn two_opt_untangles_a_scrambled_ring() {
    let problem = ring_problem();
    let search = LocalSearch::new(10, 5);
    let cost = |r: &[usize]| closed_length(&problem, r);

    let mut route = vec![1, 5, 3, 7, 2, 6, 4, 8];
    let before = cost(&route);

    search.two_opt(&mut route, &cost);
    let after = cost(&route);

    assert!(after < before);
    assert!(is_permutation_of(&route, &problem));

    // Perimeter order is the 2-opt fixed point for a convex ring.
    let optimal = cost(&[1, 2, 3, 4, 5, 6, 7, 8]);
    assert!((after - optimal).abs() < 1e-9);
}

#[test]
fn refine_never_worsens_a_route() {
    let problem = ring_problem();
    let mut search = LocalSearch::new(20, 3);
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let cost = |r: &[usize]| closed_length(&problem, r);

    let mut route = vec![4, 1, 6, 3, 8, 5, 2, 7];
    let mut previous = cost(&route);

    for _ in 0..10 {
        search.refine(&mut route, &cost, &mut rng);
        let current = cost(&route);
        assert!(current <= previous + 1e-9);
        assert!(is_permutation_of(&route, &problem));
        previous = current;
    }
}

#[test]
fn lin_kernighan_improves_a_crossing_ring() {
    let problem = ring_problem();

    let mut route = vec![1, 2, 6, 4, 5, 3, 7, 8];
    let before = closed_length(&problem, &route);

    for _ in 0..10 {
        lin_kernighan(&problem, &mut route);
    }
    let after = closed_length(&problem, &route);

    assert!(after < before);
    assert!(is_permutation_of(&route, &problem));
}

#[test]
fn lin_kernighan_leaves_the_optimum_alone() {
    let problem = ring_problem();

    let mut route: Vec<usize> = (1..=8).collect();
    let optimal = closed_length(&problem, &route);

    lin_kernighan(&problem, &mut route);
    assert!((closed_length(&problem, &route) - optimal).abs() < 1e-9);
}
