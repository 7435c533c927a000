//! Benchmarks for CGP decoding, execution and evolution.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cgp::{
    compute::{Chromosome, FunctionSet, GenomeRng, evolution::EvolutionEngine},
    schema::{ChromosomeShape, Dataset, EvolutionConfig},
};

fn shape(num_nodes: usize) -> ChromosomeShape {
    ChromosomeShape {
        num_inputs: 2,
        num_nodes,
        num_outputs: 2,
        arity: 2,
    }
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_active_nodes");
    let functions = FunctionSet::from_names("add,sub,mul,div");

    for num_nodes in [50, 200, 1000] {
        let mut rng = GenomeRng::new(42);
        let mut chromosome = Chromosome::random(shape(num_nodes), &functions, 1.0, &mut rng)
            .expect("valid shape");

        group.bench_with_input(
            BenchmarkId::from_parameter(num_nodes),
            &num_nodes,
            |b, _| {
                b.iter(|| {
                    black_box(&mut chromosome).set_active_nodes();
                });
            },
        );
    }

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    let functions = FunctionSet::from_names("add,sub,mul,div");

    for num_nodes in [50, 200, 1000] {
        let mut rng = GenomeRng::new(42);
        let mut chromosome = Chromosome::random(shape(num_nodes), &functions, 1.0, &mut rng)
            .expect("valid shape");
        let inputs = [0.5f32, -1.5];

        group.bench_with_input(
            BenchmarkId::from_parameter(num_nodes),
            &num_nodes,
            |b, _| {
                b.iter(|| {
                    let outputs = chromosome
                        .execute(&functions, black_box(&inputs))
                        .expect("matching inputs");
                    black_box(outputs[0]);
                });
            },
        );
    }

    group.finish();
}

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve_100_generations");
    group.sample_size(10);

    let xs: Vec<f32> = (0..101).map(|i| -1.0 + i as f32 * 0.02).collect();
    let ys: Vec<f32> = xs.iter().map(|x| x * x * x - x + 1.0).collect();
    let data = Dataset::from_arrays(1, 1, xs.len(), &xs, &ys).expect("consistent arrays");

    for parallel in [false, true] {
        let mut config = EvolutionConfig::new(1, 100, 1, 2);
        config.generations = 100;
        config.update_frequency = 1_000;
        config.random_seed = Some(7);
        config.parallel_evaluation = parallel;

        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut engine = EvolutionEngine::new(config.clone()).expect("valid config");
                let result = engine.run(black_box(&data)).expect("evolution runs");
                black_box(result.stats.best_fitness);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_execute, bench_generations);
criterion_main!(benches);
