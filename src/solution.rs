//! Route and tour representations for EVRP solutions.
//!
//! A *route* is a customer permutation with the depot implicit at both ends.
//! A *tour* is the full drivable node sequence produced by stitching a route:
//! it starts and ends at the depot and may contain interior depot visits
//! (sub-tours) and charging-station stops.

use crate::error::SolverError;
use crate::problem::Problem;
use log::warn;
use serde::{Deserialize, Serialize};

/// A complete EVRP tour together with its evaluated length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub nodes: Vec<usize>,
    pub length: f64,
}

/// Next position in a circular route of `len` slots.
pub fn next_pos(pos: usize, len: usize) -> usize {
    if pos + 1 < len {
        pos + 1
    } else {
        0
    }
}

/// Previous position in a circular route of `len` slots.
pub fn prev_pos(pos: usize, len: usize) -> usize {
    if pos > 0 {
        pos - 1
    } else {
        len - 1
    }
}

/// Length of a customer permutation closed over the depot
/// (depot -> route[0] -> ... -> route[n-1] -> depot).
pub fn closed_length(problem: &Problem, route: &[usize]) -> f64 {
    if route.is_empty() {
        return 0.0;
    }
    let mut closed = Vec::with_capacity(route.len() + 2);
    closed.push(problem.depot);
    closed.extend_from_slice(route);
    closed.push(problem.depot);
    problem.fitness_evaluation(&closed)
}

/// Check the permutation invariant: every customer exactly once, every
/// interior arc (and both depot arcs) directly traversable.
pub fn validate_route(problem: &Problem, route: &[usize]) -> Result<(), SolverError> {
    let expected = problem.customer_count();
    let mut seen = vec![false; problem.node_count()];
    let mut found = 0;

    for &customer in route {
        if customer >= seen.len() || seen[customer] || problem.is_charging_station(customer) {
            return Err(SolverError::InvalidRouteShape {
                expected,
                found: route.len(),
            });
        }
        seen[customer] = true;
        found += 1;
    }
    if found != expected {
        return Err(SolverError::InvalidRouteShape { expected, found });
    }

    let depot = problem.depot;
    if !problem.distance(depot, route[0]).is_finite()
        || !problem.distance(route[route.len() - 1], depot).is_finite()
    {
        return Err(SolverError::InvalidRouteShape { expected, found });
    }
    for pair in route.windows(2) {
        if !problem.distance(pair[0], pair[1]).is_finite() {
            return Err(SolverError::InvalidRouteShape { expected, found });
        }
    }
    Ok(())
}

/// Stitch a customer permutation into a full EVRP tour.
///
/// Walks the permutation in order, returning to the depot whenever the next
/// customer would exceed the remaining capacity and detouring to the nearest
/// reachable charging station whenever the battery would otherwise deplete.
/// The depot recharges as well as reloads.
pub fn stitch_tour(problem: &Problem, route: &[usize]) -> Result<Tour, SolverError> {
    let depot = problem.depot;
    let stations = problem.stations();
    // Consecutive non-customer insertions before the stitch is declared stuck.
    let stall_limit = stations.len() + 2;

    let mut tour = vec![depot];
    let mut capacity = problem.vehicle_capacity;
    let mut battery = problem.battery_capacity;
    let mut stall = 0;
    let mut i = 0;

    while i < route.len() {
        let from = *tour.last().unwrap();
        let to = route[i];

        if problem.demand(to) <= capacity && problem.energy(from, to) <= battery {
            tour.push(to);
            capacity -= problem.demand(to);
            battery -= problem.energy(from, to);
            i += 1;
            stall = 0;
            continue;
        }

        stall += 1;
        if stall > stall_limit {
            return Err(SolverError::InfeasibleConstruction { attempts: stall });
        }

        if problem.demand(to) > capacity {
            // Head back to reload; recharge happens there too.
            if problem.energy(from, depot) > battery {
                if let Some(station) = nearest_reachable_station(problem, &stations, from, battery)
                {
                    tour.push(station);
                    battery = problem.battery_capacity;
                    continue;
                }
                return Err(SolverError::InfeasibleConstruction { attempts: stall });
            }
            tour.push(depot);
            capacity = problem.vehicle_capacity;
            battery = problem.battery_capacity;
        } else {
            match nearest_reachable_station(problem, &stations, from, battery) {
                Some(station) => {
                    tour.push(station);
                    battery = problem.battery_capacity;
                }
                None if problem.energy(from, depot) <= battery => {
                    tour.push(depot);
                    capacity = problem.vehicle_capacity;
                    battery = problem.battery_capacity;
                }
                None => return Err(SolverError::InfeasibleConstruction { attempts: stall }),
            }
        }
    }

    // Close the tour back at the depot.
    loop {
        let from = *tour.last().unwrap();
        if from == depot {
            break;
        }
        if problem.energy(from, depot) <= battery {
            tour.push(depot);
            break;
        }
        stall += 1;
        if stall > stall_limit {
            return Err(SolverError::InfeasibleConstruction { attempts: stall });
        }
        match nearest_reachable_station(problem, &stations, from, battery) {
            Some(station) => {
                tour.push(station);
                battery = problem.battery_capacity;
            }
            None => return Err(SolverError::InfeasibleConstruction { attempts: stall }),
        }
    }

    let length = problem.fitness_evaluation(&tour);
    Ok(Tour { nodes: tour, length })
}

fn nearest_reachable_station(
    problem: &Problem,
    stations: &[usize],
    from: usize,
    battery: f64,
) -> Option<usize> {
    stations
        .iter()
        .copied()
        .filter(|&s| s != from && problem.energy(from, s) <= battery)
        .min_by(|&a, &b| {
            problem
                .distance(from, a)
                .partial_cmp(&problem.distance(from, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Replay a stitched tour against the capacity and battery constraints and
/// check that every customer is served exactly once.
///
/// Invariant violations are reported (and logged) rather than silently
/// accepted; callers must run this before admitting a tour as best-so-far.
pub fn validate_tour(problem: &Problem, tour: &[usize]) -> Result<(), SolverError> {
    let expected = problem.customer_count();
    let depot = problem.depot;

    if tour.first() != Some(&depot) || tour.last() != Some(&depot) {
        warn!("tour does not start and end at the depot");
        return Err(SolverError::InvalidRouteShape { expected, found: 0 });
    }

    let mut seen = vec![false; problem.node_count()];
    let mut served = 0;
    let mut capacity = problem.vehicle_capacity;
    let mut battery = problem.battery_capacity;

    for pair in tour.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        battery -= problem.energy(from, to);
        if battery < -1e-9 {
            warn!("tour depletes battery on arc {} -> {}", from, to);
            return Err(SolverError::InvalidRouteShape {
                expected,
                found: served,
            });
        }

        if to == depot {
            capacity = problem.vehicle_capacity;
        } else if !problem.is_charging_station(to) {
            capacity -= problem.demand(to);
            if capacity < -1e-9 {
                warn!("tour exceeds capacity at customer {}", to);
                return Err(SolverError::InvalidRouteShape {
                    expected,
                    found: served,
                });
            }
            if seen[to] {
                warn!("tour visits customer {} twice", to);
                return Err(SolverError::InvalidRouteShape {
                    expected,
                    found: served,
                });
            }
            seen[to] = true;
            served += 1;
        }

        if problem.is_charging_station(to) {
            battery = problem.battery_capacity;
        }
    }

    if served != expected {
        warn!("tour serves {} of {} customers", served, expected);
        return Err(SolverError::InvalidRouteShape {
            expected,
            found: served,
        });
    }
    Ok(())
}
