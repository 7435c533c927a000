//! Configuration types for CGP evolutionary runs.

use serde::{Deserialize, Serialize};

/// Structural dimensions shared by every chromosome of a run.
///
/// Two chromosomes can be copied into one another iff their shapes are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChromosomeShape {
    /// Number of primary inputs.
    pub num_inputs: usize,
    /// Number of function nodes.
    pub num_nodes: usize,
    /// Number of declared outputs.
    pub num_outputs: usize,
    /// Connections per node.
    pub arity: usize,
}

impl ChromosomeShape {
    /// Size of the flat input/node address space.
    #[inline]
    pub fn address_space(&self) -> usize {
        self.num_inputs + self.num_nodes
    }

    /// Split a flat address into an input or node reference.
    #[inline]
    pub fn resolve(&self, address: usize) -> Address {
        if address < self.num_inputs {
            Address::Input(address)
        } else {
            Address::Node(address - self.num_inputs)
        }
    }

    /// Flat address of the node at `position`.
    #[inline]
    pub fn node_address(&self, position: usize) -> usize {
        self.num_inputs + position
    }

    /// Total number of genes: function, connection and weight genes of every
    /// node, plus output genes.
    pub fn num_genes(&self) -> usize {
        self.num_nodes * (1 + 2 * self.arity) + self.num_outputs
    }

    /// Check that every dimension is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = [
            ("num_inputs", self.num_inputs),
            ("num_nodes", self.num_nodes),
            ("num_outputs", self.num_outputs),
            ("arity", self.arity),
        ]
        .into_iter()
        .find(|(_, v)| *v == 0);

        match zero {
            Some((name, _)) => Err(ConfigError::InvalidShape(format!(
                "{name} must be at least 1"
            ))),
            None => Ok(()),
        }
    }
}

/// A decoded flat address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// Index of a primary input.
    Input(usize),
    /// Position of a node.
    Node(usize),
}

/// Evolutionary strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionaryStrategy {
    /// (mu + lambda): parents compete with their children.
    #[default]
    #[serde(alias = "+")]
    Plus,
    /// (mu, lambda): only children compete.
    #[serde(alias = ",")]
    Comma,
}

/// Built-in mutation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Every gene is resampled with probability `mutation_rate`.
    #[default]
    Probabilistic,
    /// A fixed number of genes (`mutation_rate` of all genes, at least one)
    /// is resampled.
    Point,
}

/// Built-in selection schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Truncation selection of the fittest candidates.
    #[default]
    PickHighest,
}

/// Built-in reproduction schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReproductionMethod {
    /// Each child is a mutated clone of a uniformly chosen parent.
    #[default]
    MutateRandomParent,
}

/// Built-in fitness functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMethod {
    /// Sum of absolute output errors over every dataset sample.
    #[default]
    SupervisedLearning,
}

/// Top-level configuration for an evolutionary run.
///
/// Values are fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Chromosome dimensions.
    pub shape: ChromosomeShape,
    /// Number of parents.
    #[serde(default = "default_mu")]
    pub mu: usize,
    /// Number of children per generation.
    #[serde(default = "default_lambda")]
    pub lambda: usize,
    /// Whether parents compete with children.
    #[serde(default)]
    pub strategy: EvolutionaryStrategy,
    /// Per-gene mutation probability (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Weights are drawn from `[-weight_range, weight_range]`.
    #[serde(default = "default_weight_range")]
    pub weight_range: f32,
    /// Generation budget.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Progress is reported every this many generations.
    #[serde(default = "default_update_frequency")]
    pub update_frequency: usize,
    /// Comma-separated built-in node functions, e.g. `"add,sub,mul,div"`.
    #[serde(default = "default_function_set")]
    pub function_set: String,
    /// Mutation operator.
    #[serde(default)]
    pub mutation: MutationType,
    /// Selection scheme.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Reproduction scheme.
    #[serde(default)]
    pub reproduction: ReproductionMethod,
    /// Fitness function.
    #[serde(default)]
    pub fitness: FitnessMethod,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Evaluate children on the rayon thread pool.
    #[serde(default = "default_parallel_evaluation")]
    pub parallel_evaluation: bool,
}

fn default_mu() -> usize {
    1
}
fn default_lambda() -> usize {
    4
}
fn default_mutation_rate() -> f32 {
    0.05
}
fn default_weight_range() -> f32 {
    1.0
}
fn default_generations() -> usize {
    10_000
}
fn default_update_frequency() -> usize {
    1_000
}
fn default_function_set() -> String {
    "add,sub,mul,div".to_string()
}
fn default_parallel_evaluation() -> bool {
    true
}

impl EvolutionConfig {
    /// Configuration with default evolutionary settings for the given shape.
    pub fn new(num_inputs: usize, num_nodes: usize, num_outputs: usize, arity: usize) -> Self {
        Self {
            shape: ChromosomeShape {
                num_inputs,
                num_nodes,
                num_outputs,
                arity,
            },
            mu: default_mu(),
            lambda: default_lambda(),
            strategy: EvolutionaryStrategy::default(),
            mutation_rate: default_mutation_rate(),
            weight_range: default_weight_range(),
            generations: default_generations(),
            update_frequency: default_update_frequency(),
            function_set: default_function_set(),
            mutation: MutationType::default(),
            selection: SelectionMethod::default(),
            reproduction: ReproductionMethod::default(),
            fitness: FitnessMethod::default(),
            random_seed: None,
            parallel_evaluation: default_parallel_evaluation(),
        }
    }

    /// Set the number of parents. Zero is rejected with a warning and the
    /// previous value is kept.
    pub fn set_mu(&mut self, mu: usize) {
        if mu > 0 {
            self.mu = mu;
        } else {
            log::warn!(
                "mu value '{mu}' is invalid; mu must be one or greater. Mu left unchanged as '{}'",
                self.mu
            );
        }
    }

    /// Size of the selection pool for the configured strategy.
    #[inline]
    pub fn num_candidates(&self) -> usize {
        match self.strategy {
            EvolutionaryStrategy::Plus => self.mu + self.lambda,
            EvolutionaryStrategy::Comma => self.lambda,
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shape.validate()?;

        if self.mu == 0 {
            return Err(ConfigError::InvalidMu);
        }
        if self.lambda == 0 {
            return Err(ConfigError::InvalidLambda);
        }
        if self.strategy == EvolutionaryStrategy::Comma && self.lambda < self.mu {
            return Err(ConfigError::NotEnoughChildren {
                mu: self.mu,
                lambda: self.lambda,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if !(self.weight_range > 0.0 && self.weight_range.is_finite()) {
            return Err(ConfigError::InvalidWeightRange(self.weight_range));
        }
        if self.generations == 0 {
            return Err(ConfigError::InvalidGenerations);
        }
        if self.update_frequency == 0 {
            return Err(ConfigError::InvalidUpdateFrequency);
        }
        Ok(())
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self::new(1, 10, 1, 2)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid chromosome shape: {0}")]
    InvalidShape(String),
    #[error("Mu must be at least 1")]
    InvalidMu,
    #[error("Lambda must be at least 1")]
    InvalidLambda,
    #[error("Comma strategy needs lambda ({lambda}) >= mu ({mu})")]
    NotEnoughChildren { mu: usize, lambda: usize },
    #[error("Mutation rate {0} must be within [0, 1]")]
    InvalidMutationRate(f32),
    #[error("Weight range {0} must be positive and finite")]
    InvalidWeightRange(f32),
    #[error("Generation budget must be positive")]
    InvalidGenerations,
    #[error("Update frequency must be positive")]
    InvalidUpdateFrequency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mu, 1);
        assert_eq!(config.lambda, 4);
        assert_eq!(config.strategy, EvolutionaryStrategy::Plus);
        assert_eq!(config.generations, 10_000);
    }

    #[test]
    fn test_set_mu_rejects_zero() {
        let mut config = EvolutionConfig::default();
        config.set_mu(3);
        assert_eq!(config.mu, 3);
        config.set_mu(0);
        assert_eq!(config.mu, 3);
    }

    #[test]
    fn test_num_candidates() {
        let mut config = EvolutionConfig::new(2, 10, 1, 2);
        config.mu = 2;
        config.lambda = 5;
        assert_eq!(config.num_candidates(), 7);
        config.strategy = EvolutionaryStrategy::Comma;
        assert_eq!(config.num_candidates(), 5);
    }

    #[test]
    fn test_validation_errors() {
        let base = EvolutionConfig::new(2, 10, 1, 2);

        let mut c = base.clone();
        c.shape.arity = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidShape(_))));

        let mut c = base.clone();
        c.mutation_rate = 1.5;
        assert_eq!(c.validate(), Err(ConfigError::InvalidMutationRate(1.5)));

        let mut c = base.clone();
        c.weight_range = 0.0;
        assert_eq!(c.validate(), Err(ConfigError::InvalidWeightRange(0.0)));

        let mut c = base.clone();
        c.strategy = EvolutionaryStrategy::Comma;
        c.mu = 3;
        c.lambda = 2;
        assert_eq!(
            c.validate(),
            Err(ConfigError::NotEnoughChildren { mu: 3, lambda: 2 })
        );

        let mut c = base.clone();
        c.update_frequency = 0;
        assert_eq!(c.validate(), Err(ConfigError::InvalidUpdateFrequency));
    }

    #[test]
    fn test_resolve_address() {
        let shape = ChromosomeShape {
            num_inputs: 2,
            num_nodes: 3,
            num_outputs: 1,
            arity: 2,
        };
        assert_eq!(shape.resolve(1), Address::Input(1));
        assert_eq!(shape.resolve(2), Address::Node(0));
        assert_eq!(shape.resolve(4), Address::Node(2));
        assert_eq!(shape.num_genes(), 3 * 5 + 1);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "shape": { "num_inputs": 1, "num_nodes": 50, "num_outputs": 1, "arity": 2 },
            "strategy": ",",
            "mutation": "point"
        }"#;
        let config: EvolutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.strategy, EvolutionaryStrategy::Comma);
        assert_eq!(config.mutation, MutationType::Point);
        assert_eq!(config.mu, 1);
        assert_eq!(config.function_set, "add,sub,mul,div");
        assert!(config.parallel_evaluation);
    }

    #[test]
    fn test_serialization() {
        let config = EvolutionConfig::new(3, 20, 2, 3);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
