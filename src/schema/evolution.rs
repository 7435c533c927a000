//! Progress and summary records for evolutionary runs.

use serde::{Deserialize, Serialize};

/// Snapshot handed to progress callbacks after each reported generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Zero-based generation index.
    pub generation: usize,
    /// Generation budget.
    pub total_generations: usize,
    /// Fitness of the best parent after selection.
    pub best_fitness: f32,
    /// Active nodes in the best parent.
    pub active_nodes: usize,
    /// Whether the best parent is a perfect solution.
    pub solved: bool,
}

/// Statistics from an evolutionary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations actually run.
    pub generations: usize,
    /// Fitness evaluations performed, including initial parent scoring.
    pub total_evaluations: u64,
    /// Best fitness achieved.
    pub best_fitness: f32,
    /// Wall-clock time (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// A parent reached fitness zero or below.
    SolutionFound,
    /// The generation budget was exhausted.
    MaxGenerations,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SolutionFound => write!(f, "solution found"),
            Self::MaxGenerations => write!(f, "generation budget exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialization() {
        let stats = EvolutionStats {
            generations: 12,
            total_evaluations: 49,
            best_fitness: 0.0,
            elapsed_seconds: 0.5,
            evaluations_per_second: 98.0,
            stop_reason: StopReason::SolutionFound,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"SolutionFound\""));
        let parsed: EvolutionStats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stats);
    }
}
