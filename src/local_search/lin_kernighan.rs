//! Bounded Lin-Kernighan arc exchange over a customer permutation.

use super::IMPROVEMENT_EPS;
use crate::problem::Problem;
use crate::solution::{closed_length, next_pos, prev_pos};
use log::warn;

/// One bounded Lin-Kernighan pass.
///
/// The scan runs over the depot-closed cycle (depot plus the customer
/// permutation), so every arc the exchange breaks or adds is one the closed
/// route length actually pays for. For every position the pass breaks an
/// adjacent arc, reconnects through the nearest neighbor of the freed
/// endpoint, and extends the exchange one level deeper when the three-arc
/// variant promises at least the two-arc gain. Candidate reconnections that
/// do not close into a single tour are discarded. The best candidate of the
/// whole scan is applied only if it shortens the route, so the pass never
/// worsens its input.
pub fn lin_kernighan(problem: &Problem, route: &mut Vec<usize>) {
    if route.len() < 5 {
        return;
    }

    let mut cycle = Vec::with_capacity(route.len() + 1);
    cycle.push(problem.depot);
    cycle.extend_from_slice(route);

    let base = closed_length(problem, route);
    let mut best: Option<(Vec<usize>, f64)> = None;

    for p1 in 0..cycle.len() {
        let exchange = match plan_exchange(problem, &cycle, p1) {
            Some(exchange) => exchange,
            None => continue,
        };

        let candidate = match exchange {
            Exchange::Two(p1, p2, p3, p4) => {
                reconnect(&cycle, &[(p1, p2), (p3, p4)], &[(p2, p3), (p1, p4)])
            }
            Exchange::Three(p1, p2, p3, p4, p5, p6) => reconnect(
                &cycle,
                &[(p1, p2), (p3, p4), (p5, p6)],
                &[(p2, p3), (p4, p5), (p1, p6)],
            ),
        };

        let candidate = match candidate {
            Some(candidate) => open_at_depot(candidate, problem.depot),
            None => {
                warn!("arc exchange at position {} broke the tour; discarded", p1);
                continue;
            }
        };

        let length = closed_length(problem, &candidate);
        if best.as_ref().map_or(true, |(_, shortest)| length < *shortest) {
            best = Some((candidate, length));
        }
    }

    if let Some((candidate, length)) = best {
        if length + IMPROVEMENT_EPS < base {
            *route = candidate;
        }
    }
}

enum Exchange {
    Two(usize, usize, usize, usize),
    Three(usize, usize, usize, usize, usize, usize),
}

/// Pick the arcs to exchange around position `p1`, preferring the deeper
/// three-arc variant when its projected gain covers the two-arc gain.
fn plan_exchange(problem: &Problem, route: &[usize], p1: usize) -> Option<Exchange> {
    let n = route.len();
    let d = |a: usize, b: usize| problem.distance(route[a], route[b]);

    // Break the adjacent arc whose freed endpoint has a strictly closer
    // neighbor elsewhere in the route.
    let mut p2 = next_pos(p1, n);
    let mut v3 = nearest_neighbor(problem, route, route[p2], &[route[p1], route[p2]])?;
    if problem.distance(route[p2], v3) >= d(p1, p2) {
        p2 = prev_pos(p1, n);
        v3 = nearest_neighbor(problem, route, route[p2], &[route[p1], route[p2]])?;
        if problem.distance(route[p2], v3) >= d(p1, p2) {
            return None;
        }
    }

    let p3 = route.iter().position(|&node| node == v3)?;
    let mut p4 = next_pos(p3, n);
    if !closure_ok(p1, p2, p3, p4, n) {
        p4 = prev_pos(p3, n);
    }
    if !closure_ok(p1, p2, p3, p4, n) {
        return None;
    }

    let gain_two = d(p1, p2) + d(p3, p4) - d(p2, p3) - d(p1, p4);
    if gain_two <= IMPROVEMENT_EPS {
        return None;
    }

    // Depth-3 extension from the endpoint the two-arc exchange frees.
    if let Some(v5) = nearest_neighbor(
        problem,
        route,
        route[p4],
        &[route[p1], route[p2], route[p3], route[p4]],
    ) {
        if let Some(p5) = route.iter().position(|&node| node == v5) {
            let mut p6 = next_pos(p5, n);
            if !closure_ok(p3, p4, p5, p6, n) {
                p6 = prev_pos(p5, n);
            }
            if closure_ok(p3, p4, p5, p6, n) && distinct(&[p1, p2, p3, p4, p5, p6]) {
                let gain_three =
                    d(p1, p2) + d(p3, p4) + d(p5, p6) - d(p2, p3) - d(p4, p5) - d(p1, p6);
                if gain_three >= gain_two {
                    return Some(Exchange::Three(p1, p2, p3, p4, p5, p6));
                }
            }
        }
    }

    Some(Exchange::Two(p1, p2, p3, p4))
}

/// An exchange may only pair arcs of opposite orientation, or the
/// reconnection degenerates into two disjoint cycles. Orientation follows
/// the circular successor order, so the wrap arc counts as forward.
fn closure_ok(p1: usize, p2: usize, p3: usize, p4: usize, n: usize) -> bool {
    distinct(&[p1, p2, p3, p4]) && (next_pos(p1, n) == p2) != (next_pos(p3, n) == p4)
}

/// Rotate a reconnected cycle so the depot leads, then drop it, leaving a
/// customer permutation.
fn open_at_depot(mut cycle: Vec<usize>, depot: usize) -> Vec<usize> {
    if let Some(at) = cycle.iter().position(|&node| node == depot) {
        cycle.rotate_left(at);
        cycle.remove(0);
    }
    cycle
}

fn distinct(positions: &[usize]) -> bool {
    positions
        .iter()
        .enumerate()
        .all(|(i, a)| positions[i + 1..].iter().all(|b| a != b))
}

/// Nearest route node to `of`, skipping `of` itself and `exclude`.
fn nearest_neighbor(
    problem: &Problem,
    route: &[usize],
    of: usize,
    exclude: &[usize],
) -> Option<usize> {
    route
        .iter()
        .copied()
        .filter(|&node| node != of && !exclude.contains(&node))
        .min_by(|&a, &b| {
            problem
                .distance(of, a)
                .partial_cmp(&problem.distance(of, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Rebuild the tour after swapping `removed` arcs (position pairs) for
/// `added` ones. Returns `None` unless the result is a single cycle over
/// every position, the shape every valid exchange must produce.
fn reconnect(
    route: &[usize],
    removed: &[(usize, usize)],
    added: &[(usize, usize)],
) -> Option<Vec<usize>> {
    let n = route.len();
    let mut adjacent: Vec<Vec<usize>> = (0..n)
        .map(|p| vec![prev_pos(p, n), next_pos(p, n)])
        .collect();

    for &(a, b) in removed {
        adjacent[a].retain(|&p| p != b);
        adjacent[b].retain(|&p| p != a);
    }
    for &(a, b) in added {
        adjacent[a].push(b);
        adjacent[b].push(a);
    }
    if adjacent.iter().any(|links| links.len() != 2) {
        return None;
    }

    let start = removed[0].0;
    let mut out = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    let mut previous = usize::MAX;
    let mut current = start;

    for _ in 0..n {
        if seen[current] {
            return None;
        }
        seen[current] = true;
        out.push(route[current]);

        let next = if adjacent[current][0] != previous {
            adjacent[current][0]
        } else {
            adjacent[current][1]
        };
        previous = current;
        current = next;
    }

    if current == start {
        Some(out)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Node, NodeKind, Problem};

    fn grid_problem() -> Problem {
        // Depot at the origin, customers on a unit-ish ring.
        let nodes = vec![
            Node::new(0, 0.0, 0.0, 0.0, NodeKind::Depot),
            Node::new(1, 2.0, 0.0, 1.0, NodeKind::Customer),
            Node::new(2, 4.0, 0.0, 1.0, NodeKind::Customer),
            Node::new(3, 4.0, 2.0, 1.0, NodeKind::Customer),
            Node::new(4, 2.0, 2.0, 1.0, NodeKind::Customer),
            Node::new(5, 0.0, 2.0, 1.0, NodeKind::Customer),
        ];
        Problem::new("grid".to_string(), nodes, 100.0, 1e6, 1.0, 1)
    }

    #[test]
    fn orientation_test_is_circular() {
        // The wrap arc (4, 0) runs forward on a 5-cycle: paired with the
        // backward arc (2, 1) the exchange closes, paired with the forward
        // arc (1, 2) it would split into two cycles.
        assert!(closure_ok(4, 0, 2, 1, 5));
        assert!(!closure_ok(4, 0, 1, 2, 5));
    }

    #[test]
    fn reconnect_rejects_degenerate_exchanges() {
        let route = vec![1, 2, 3, 4, 5];
        // Re-adding an arc that was never removed doubles it; the walk can
        // no longer cover every position in one cycle.
        let degenerate = reconnect(&route, &[(0, 1), (2, 3)], &[(0, 3), (1, 2)]);
        assert!(degenerate.is_none());
    }

    #[test]
    fn reconnect_reverses_a_segment() {
        let route = vec![1, 2, 3, 4, 5];
        let joined = reconnect(&route, &[(0, 1), (3, 2)], &[(1, 3), (0, 2)]);

        let joined = joined.expect("opposite-orientation exchange must close");
        let mut sorted = joined.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn untangles_a_crossing_tour() {
        let problem = grid_problem();
        // Perimeter order is 1-2-3-4-5; this order crosses itself.
        let mut route = vec![1, 4, 3, 2, 5];
        let before = closed_length(&problem, &route);

        for _ in 0..5 {
            lin_kernighan(&problem, &mut route);
        }
        let after = closed_length(&problem, &route);
        assert!(after < before);

        let mut sorted = route.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn never_worsens_an_optimal_tour() {
        let problem = grid_problem();
        let mut route = vec![1, 2, 3, 4, 5];
        let before = closed_length(&problem, &route);

        lin_kernighan(&problem, &mut route);
        assert!(closed_length(&problem, &route) <= before + 1e-9);
    }
}
