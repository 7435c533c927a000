//! Evolutionary search over CGP chromosomes.
//!
//! # Overview
//!
//! The evolutionary loop is assembled from four pluggable capabilities, each a
//! trait in `hooks` with a built-in implementation:
//!
//! - **Mutation** (`mutation`): per-gene probabilistic or fixed-count point mutation
//! - **Fitness** (`fitness`): supervised-learning error over a dataset
//! - **Selection** (`selection`): truncation selection of the fittest candidates
//! - **Reproduction** (`reproduction`): mutated clones of random parents
//!
//! [`EvolutionEngine`] drives a [`Population`] through generations until a
//! chromosome reaches fitness zero or the generation budget runs out.
//!
//! # Example
//!
//! ```rust,no_run
//! use cgp::compute::evolution::EvolutionEngine;
//! use cgp::schema::{Dataset, EvolutionConfig};
//!
//! let data = Dataset::from_file("symbolic.data").unwrap();
//! let mut config = EvolutionConfig::new(1, 50, 1, 2);
//! config.generations = 10_000;
//!
//! let mut engine = EvolutionEngine::new(config).unwrap();
//! let result = engine.run_with_callback(&data, |progress| {
//!     println!("{}\t{}", progress.generation, progress.best_fitness);
//! }).unwrap();
//!
//! println!("{}", result.best.display(engine.functions()));
//! println!("Generations: {}", result.stats.generations);
//! ```

mod fitness;
mod hooks;
mod mutation;
mod population;
mod reproduction;
mod search;
mod selection;

pub use fitness::{FitnessError, SupervisedLearning};
pub use hooks::{
    EvolutionHooks, FitnessFunction, MutationContext, MutationOperator, ReproductionScheme,
    SelectionScheme,
};
pub use mutation::{PointMutation, ProbabilisticMutation};
pub use population::Population;
pub use reproduction::MutateRandomParent;
pub use search::{EvolutionEngine, EvolutionError, EvolutionResult};
pub use selection::{PickHighest, sort_candidates};
