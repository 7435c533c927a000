//! Symbolic regression of x^6 - 2x^4 + x^2 with the default hooks.

use std::time::Instant;

use cgp::{
    EvolutionEngine,
    schema::{Dataset, EvolutionConfig, EvolutionaryStrategy, MutationType},
};

fn target(x: f32) -> f32 {
    x.powi(6) - 2.0 * x.powi(4) + x.powi(2)
}

fn main() {
    env_logger::init();

    println!("=== Symbolic Regression ===\n");

    let xs: Vec<f32> = (0..50).map(|i| -1.0 + i as f32 * (2.0 / 49.0)).collect();
    let ys: Vec<f32> = xs.iter().map(|&x| target(x)).collect();
    let data = Dataset::from_arrays(1, 1, xs.len(), &xs, &ys).unwrap();

    for (strategy, mutation) in [
        (EvolutionaryStrategy::Plus, MutationType::Probabilistic),
        (EvolutionaryStrategy::Plus, MutationType::Point),
        (EvolutionaryStrategy::Comma, MutationType::Probabilistic),
    ] {
        println!("Strategy {:?}, mutation {:?}", strategy, mutation);

        let mut config = EvolutionConfig::new(1, 50, 1, 2);
        config.strategy = strategy;
        config.mutation = mutation;
        config.lambda = 4;
        config.mutation_rate = 0.08;
        config.generations = 10_000;
        config.update_frequency = 2_500;
        config.random_seed = Some(42);

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config).unwrap();
        let result = engine
            .run_with_callback(&data, |progress| {
                println!("  {}\t{:.4}", progress.generation, progress.best_fitness);
            })
            .unwrap();
        let elapsed = start.elapsed();

        println!("  Stop reason:    {}", result.stats.stop_reason);
        println!("  Generations:    {}", result.stats.generations);
        println!("  Evaluations:    {}", result.stats.total_evaluations);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Best fitness:   {:.4}", result.stats.best_fitness);
        println!("  Active nodes:   {}", result.best.num_active_nodes());
        println!();
    }

    // Custom node function alongside the built-ins.
    let mut config = EvolutionConfig::new(1, 20, 1, 2);
    config.function_set = "add,mul".to_string();
    config.generations = 5_000;
    config.update_frequency = 5_000;
    config.random_seed = Some(7);

    let mut engine = EvolutionEngine::new(config).unwrap();
    engine
        .functions_mut()
        .register("sq", |inputs, _weights| inputs[0] * inputs[0])
        .unwrap();
    let result = engine.run(&data).unwrap();

    println!("{}", engine.functions());
    println!("{}", result.best.display(engine.functions()));
    println!("Best fitness: {:.4}", result.stats.best_fitness);
}
