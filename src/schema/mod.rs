//! Schema module - Configuration, dataset and run summary types for CGP.

mod config;
mod dataset;
mod evolution;

pub use config::*;
pub use dataset::*;
pub use evolution::*;
