//! Tests for the genetic layer.

use evrp_aco::genetic::GeneticAlgorithm;
use evrp_aco::{Config, Node, NodeKind, Problem};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

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
    Problem::new("ring".to_string(), nodes, 100.0, 1e6, 1.0, 2)
}

#[test]
fn initialization_fills_the_population_with_permutations() {
    let problem = ring_problem();
    let config = Config::genetic_preset().with_cluster_count(4);
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let mut algorithm = GeneticAlgorithm::new(&problem, &config);
    algorithm.initialize(&mut rng).unwrap();

    let (route, length) = algorithm.best().expect("population must not be empty");
    assert!(length > 0.0);

    let mut sorted = route.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, problem.customers());
}

#[test]
fn best_record_never_trails_the_population() {
    let problem = ring_problem();
    let config = Config::genetic_preset()
        .with_cluster_count(4)
        .with_generations(15);
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let mut algorithm = GeneticAlgorithm::new(&problem, &config);
    algorithm.run_generations(config.generations, &mut rng).unwrap();

    let history = algorithm.generation_history();
    assert_eq!(history.len(), 15);

    // The validated best-so-far record saw every generation's leader, so it
    // is at least as short as all of them.
    let (_, best) = algorithm.best().unwrap();
    for &recorded in history {
        assert!(best <= recorded + 1e-9);
    }
}

#[test]
fn evolved_best_is_still_a_permutation() {
    let problem = ring_problem();
    let config = Config::genetic_preset().with_cluster_count(4);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let mut algorithm = GeneticAlgorithm::new(&problem, &config);
    algorithm.run_generations(config.generations, &mut rng).unwrap();

    let (route, _) = algorithm.best().unwrap();
    let mut sorted = route.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, problem.customers());
}

#[test]
fn seeded_evolution_is_reproducible() {
    let problem = ring_problem();
    let config = Config::genetic_preset().with_cluster_count(4);

    let mut first_rng = ChaCha8Rng::seed_from_u64(33);
    let mut first = GeneticAlgorithm::new(&problem, &config);
    first.run_generations(config.generations, &mut first_rng).unwrap();

    let mut second_rng = ChaCha8Rng::seed_from_u64(33);
    let mut second = GeneticAlgorithm::new(&problem, &config);
    second.run_generations(config.generations, &mut second_rng).unwrap();

    assert_eq!(first.best().unwrap().1, second.best().unwrap().1);
}
