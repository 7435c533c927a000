//! Cartesian Genetic Programming - evolve small executable graphs from example data.
//!
//! A chromosome is a fixed grid of function nodes whose connection genes may
//! only point backwards, so every genotype is a feed-forward graph. Evolution
//! uses a (mu + lambda) or (mu, lambda) strategy over per-gene mutation.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, datasets and run statistics
//! - `compute`: Function registry, chromosomes and evolutionary search
//!
//! # Example
//!
//! ```rust,no_run
//! use cgp::{
//!     compute::evolution::EvolutionEngine,
//!     schema::{Dataset, EvolutionConfig},
//! };
//!
//! // y = x^2 + x sampled at a few points
//! let xs = [-1.0f32, -0.5, 0.0, 0.5, 1.0];
//! let ys: Vec<f32> = xs.iter().map(|x| x * x + x).collect();
//! let data = Dataset::from_arrays(1, 1, xs.len(), &xs, &ys).unwrap();
//!
//! let config = EvolutionConfig::new(1, 30, 1, 2);
//! let mut engine = EvolutionEngine::new(config).unwrap();
//! let result = engine.run(&data).unwrap();
//!
//! println!("Best fitness: {}", result.stats.best_fitness);
//! println!("{}", result.best.display(engine.functions()));
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, EvolutionError, EvolutionResult, Population};
pub use compute::{Chromosome, FunctionSet};
pub use schema::{Dataset, EvolutionConfig};
