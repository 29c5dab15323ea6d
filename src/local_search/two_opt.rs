//! Complete 2-opt over every position pair.

use super::{LocalSearch, IMPROVEMENT_EPS};

impl LocalSearch {
    /// Exhaustive 2-opt: try reversing every `[i..=j]` segment, keep any
    /// reversal that shortens the route, and repeat until a full sweep of
    /// passes (the stagnant-pass budget) produces no improvement.
    ///
    /// Reversals are applied in place and undone when they do not pay off,
    /// so the route is never worse than its input.
    pub fn two_opt(&self, route: &mut [usize], cost: &impl Fn(&[usize]) -> f64) {
        let n = route.len();
        if n < 3 {
            return;
        }

        let mut best = cost(route);
        let mut stagnant = 0;

        while stagnant < self.two_opt_iterations {
            let mut improved = false;

            for i in 0..n - 1 {
                for j in i + 1..n {
                    route[i..=j].reverse();
                    let candidate = cost(route);
                    if candidate + IMPROVEMENT_EPS < best {
                        best = candidate;
                        improved = true;
                    } else {
                        route[i..=j].reverse();
                    }
                }
            }

            if improved {
                stagnant = 0;
            } else {
                stagnant += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::local_search::LocalSearch;

    // Points on a line; optimal open path visits them in coordinate order.
    fn line_cost(route: &[usize]) -> f64 {
        let coords: [f64; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let mut length = coords[route[0]];
        for pair in route.windows(2) {
            length += (coords[pair[0]] - coords[pair[1]]).abs();
        }
        length + coords[route[route.len() - 1]]
    }

    #[test]
    fn untangles_a_scrambled_line() {
        let search = LocalSearch::new(10, 5);
        let mut route = vec![3, 1, 5, 2, 4];
        search.two_opt(&mut route, &line_cost);

        assert!((line_cost(&route) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn never_worsens_and_is_idempotent() {
        let search = LocalSearch::new(10, 5);
        let mut route = vec![4, 2, 1, 3, 5];
        let before = line_cost(&route);

        search.two_opt(&mut route, &line_cost);
        let after = line_cost(&route);
        assert!(after <= before);

        let settled = route.clone();
        search.two_opt(&mut route, &line_cost);
        assert_eq!(route, settled);
    }
}
