//! CGP CLI - Evolve a chromosome for a dataset from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;

use cgp::{
    compute::evolution::EvolutionEngine,
    schema::{Dataset, EvolutionConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 3 {
        eprintln!("Usage: {} <config.json> <data.csv> [output.json]", args[0]);
        eprintln!();
        eprintln!("Evolve a CGP chromosome that fits the given dataset.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to evolution configuration file");
        eprintln!("  data.csv     Dataset: header 'inputs,outputs,samples' then one sample per line");
        eprintln!("  output.json  Optional path to save the best chromosome");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    let config_path = PathBuf::from(&args[1]);
    let data_path = PathBuf::from(&args[2]);
    let output_path = args.get(3).map(PathBuf::from);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load dataset
    let data = Dataset::from_file(&data_path).unwrap_or_else(|e| {
        eprintln!("Error loading dataset: {}", e);
        std::process::exit(1);
    });

    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let config = engine.config();
    println!("Cartesian Genetic Programming");
    println!("=============================");
    println!(
        "Shape: {} inputs, {} nodes, {} outputs, arity {}",
        config.shape.num_inputs,
        config.shape.num_nodes,
        config.shape.num_outputs,
        config.shape.arity
    );
    println!(
        "Strategy: ({} {} {}), mutation rate {}",
        config.mu,
        match config.strategy {
            cgp::schema::EvolutionaryStrategy::Plus => "+",
            cgp::schema::EvolutionaryStrategy::Comma => ",",
        },
        config.lambda,
        config.mutation_rate
    );
    println!("{}", engine.functions());
    println!("Samples: {}", data.num_samples());
    println!();

    println!("Gen\tfit");
    let result = engine
        .run_with_callback(&data, |progress| {
            if progress.solved {
                println!(
                    "{}\t{} - Solution Found",
                    progress.generation, progress.best_fitness
                );
            } else {
                println!("{}\t{}", progress.generation, progress.best_fitness);
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        });

    println!();
    println!("{}", result.best.display(engine.functions()));
    println!("Results:");
    println!("  Stop reason: {}", result.stats.stop_reason);
    println!("  Generations: {}", result.stats.generations);
    println!("  Best fitness: {}", result.stats.best_fitness);
    println!("  Active nodes: {}", result.best.num_active_nodes());
    println!("  Evaluations: {}", result.stats.total_evaluations);
    println!(
        "  Time: {:.2}s ({:.0} evals/s)",
        result.stats.elapsed_seconds, result.stats.evaluations_per_second
    );

    if let Some(path) = output_path {
        let json = serde_json::to_string_pretty(&result.best).unwrap_or_else(|e| {
            eprintln!("Error serializing chromosome: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = fs::write(&path, json) {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("Saved best chromosome to {}", path.display());
    }
}

fn print_example_config() {
    let mut config = EvolutionConfig::new(1, 50, 1, 2);
    config.function_set = "add,sub,mul,div".to_string();
    config.generations = 10_000;
    config.update_frequency = 500;
    config.random_seed = Some(42);

    let json = serde_json::to_string_pretty(&config).unwrap_or_else(|e| {
        eprintln!("Error serializing example config: {}", e);
        std::process::exit(1);
    });
    println!("{}", json);
}
