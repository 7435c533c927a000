//! Pluggable capabilities of the evolutionary loop.
//!
//! Each of the four steps that vary between CGP setups (mutation, fitness
//! scoring, selection and reproduction) is a trait. The built-in operators
//! implement these traits like any caller-supplied type would.

use crate::compute::{Chromosome, ChromosomeError, FunctionSet, GenomeRng};
use crate::schema::{
    Dataset, EvolutionConfig, FitnessMethod, MutationType, ReproductionMethod, SelectionMethod,
};

use super::fitness::{FitnessError, SupervisedLearning};
use super::mutation::{PointMutation, ProbabilisticMutation};
use super::reproduction::MutateRandomParent;
use super::selection::PickHighest;

/// Everything a mutation operator may draw on.
pub struct MutationContext<'a> {
    /// Registered node functions.
    pub functions: &'a FunctionSet,
    /// Per-gene mutation probability.
    pub mutation_rate: f32,
    /// Symmetric bound for resampled weights.
    pub weight_range: f32,
    /// Run RNG.
    pub rng: &'a mut GenomeRng,
}

/// Perturbs a chromosome's genes in place.
///
/// Implementations must keep every connection gene of the node at position
/// `p` below `num_inputs + p`; drawing through [`GenomeRng::random_connection`]
/// guarantees this.
pub trait MutationOperator: Send + Sync {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        ctx: &mut MutationContext<'_>,
    ) -> Result<(), ChromosomeError>;
}

/// Scores a chromosome against a dataset. Lower is better; zero or below is
/// treated as a perfect solution.
///
/// The chromosome is decoded before scoring.
pub trait FitnessFunction: Send + Sync {
    fn score(
        &self,
        chromosome: &mut Chromosome,
        functions: &FunctionSet,
        data: &Dataset,
    ) -> Result<f32, FitnessError>;
}

/// Chooses the next parents from a candidate pool.
///
/// `candidates` may be reordered freely. Every slot of `parents` must be
/// overwritten.
pub trait SelectionScheme: Send + Sync {
    fn select(
        &self,
        parents: &mut [Chromosome],
        candidates: &mut [Chromosome],
    ) -> Result<(), ChromosomeError>;
}

/// Fills every child slot from the current parents.
pub trait ReproductionScheme: Send + Sync {
    fn reproduce(
        &self,
        parents: &[Chromosome],
        children: &mut [Chromosome],
        mutation: &dyn MutationOperator,
        ctx: &mut MutationContext<'_>,
    ) -> Result<(), ChromosomeError>;
}

/// The four capabilities used by an evolutionary run.
pub struct EvolutionHooks {
    pub mutation: Box<dyn MutationOperator>,
    pub fitness: Box<dyn FitnessFunction>,
    pub selection: Box<dyn SelectionScheme>,
    pub reproduction: Box<dyn ReproductionScheme>,
}

impl EvolutionHooks {
    /// Built-in hooks named by the configuration.
    pub fn from_config(config: &EvolutionConfig) -> Self {
        let mutation: Box<dyn MutationOperator> = match config.mutation {
            MutationType::Probabilistic => Box::new(ProbabilisticMutation),
            MutationType::Point => Box::new(PointMutation),
        };
        let fitness: Box<dyn FitnessFunction> = match config.fitness {
            FitnessMethod::SupervisedLearning => Box::new(SupervisedLearning),
        };
        let selection: Box<dyn SelectionScheme> = match config.selection {
            SelectionMethod::PickHighest => Box::new(PickHighest),
        };
        let reproduction: Box<dyn ReproductionScheme> = match config.reproduction {
            ReproductionMethod::MutateRandomParent => Box::new(MutateRandomParent),
        };

        Self {
            mutation,
            fitness,
            selection,
            reproduction,
        }
    }

    /// Replace the mutation operator.
    pub fn with_mutation(mut self, mutation: impl MutationOperator + 'static) -> Self {
        self.mutation = Box::new(mutation);
        self
    }

    /// Replace the fitness function.
    pub fn with_fitness(mut self, fitness: impl FitnessFunction + 'static) -> Self {
        self.fitness = Box::new(fitness);
        self
    }

    /// Replace the selection scheme.
    pub fn with_selection(mut self, selection: impl SelectionScheme + 'static) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Replace the reproduction scheme.
    pub fn with_reproduction(mut self, reproduction: impl ReproductionScheme + 'static) -> Self {
        self.reproduction = Box::new(reproduction);
        self
    }
}

impl Default for EvolutionHooks {
    fn default() -> Self {
        Self::from_config(&EvolutionConfig::default())
    }
}
