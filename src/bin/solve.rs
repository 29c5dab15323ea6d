//! Command line runner for the EVRP solvers.

use clap::{Parser, ValueEnum};
use evrp_aco::{Config, EvrpSolver, Heuristic, PheromonePolicy, Problem};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicArg {
    Aco,
    Caco,
    Genetic,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Standard,
    Charging,
    MaxMin,
}

/// Solve an EVRP instance with one of the bundled metaheuristics.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON problem instance.
    instance: PathBuf,

    /// Which solver to run.
    #[arg(long, value_enum, default_value_t = HeuristicArg::Aco)]
    heuristic: HeuristicArg,

    /// Pheromone-update policy for ant colony construction.
    #[arg(long, value_enum, default_value_t = PolicyArg::Standard)]
    policy: PolicyArg,

    /// Outer iteration count; defaults to the heuristic's preset.
    #[arg(long)]
    iterations: Option<usize>,

    /// Number of route-constructing agents per iteration.
    #[arg(long)]
    ants: Option<usize>,

    /// Cluster count for the clustered and genetic solvers.
    #[arg(long)]
    clusters: Option<usize>,

    /// RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full report as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let raw = fs::read_to_string(&args.instance)?;
    let mut problem: Problem = serde_json::from_str(&raw)?;
    problem.rebuild();
    println!(
        "Loaded {}: {} customers, {} charging stations",
        problem.name,
        problem.customer_count(),
        problem.stations().len()
    );

    let mut config = match args.heuristic {
        HeuristicArg::Aco => match args.policy {
            PolicyArg::MaxMin => Config::max_min_preset(),
            PolicyArg::Charging => Config::charging_preset(),
            PolicyArg::Standard => Config::aco_preset(),
        },
        HeuristicArg::Caco => Config::clustered_preset(),
        HeuristicArg::Genetic => Config::genetic_preset(),
    };
    config.heuristic = match args.heuristic {
        HeuristicArg::Aco => Heuristic::AntColony,
        HeuristicArg::Caco => Heuristic::ClusteredAntColony,
        HeuristicArg::Genetic => Heuristic::Genetic,
    };
    config.policy = match args.policy {
        PolicyArg::Standard => PheromonePolicy::Standard,
        PolicyArg::Charging => PheromonePolicy::ChargingAware,
        PolicyArg::MaxMin => PheromonePolicy::ElitistMaxMin,
    };
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(ants) = args.ants {
        config.num_ants = ants;
    }
    if let Some(clusters) = args.clusters {
        config.cluster_count = Some(clusters);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let start = Instant::now();
    let report = EvrpSolver::new(&problem, config).run()?;
    let runtime = start.elapsed();

    println!("Search completed in {:.2?}", runtime);
    println!("Tour length: {:.2}", report.length);
    println!("Tour nodes:  {:?}", report.tour.nodes);
    println!("Evaluations: {:.1}", report.evals);

    if let Some(path) = args.output {
        fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
