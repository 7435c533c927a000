//! Compute module - Function registry, chromosomes and evolutionary search.

mod chromosome;
mod functions;
mod rng;

pub mod evolution;

pub use chromosome::*;
pub use functions::*;
pub use rng::*;
