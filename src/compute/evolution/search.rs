//! The generational (mu + lambda) / (mu, lambda) search loop.

use std::time::Instant;

use rayon::prelude::*;

use crate::compute::{Chromosome, ChromosomeError, FunctionSet, GenomeRng};
use crate::schema::{
    ConfigError, Dataset, DatasetError, EvolutionConfig, EvolutionProgress, EvolutionStats,
    EvolutionaryStrategy, StopReason,
};

use super::fitness::FitnessError;
use super::hooks::{EvolutionHooks, FitnessFunction, MutationContext};
use super::population::Population;

/// Errors that abort an evolutionary run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chromosome(#[from] ChromosomeError),
    #[error(transparent)]
    Fitness(#[from] FitnessError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("Population does not match the configuration: {0}")]
    PopulationMismatch(String),
}

/// Outcome of [`EvolutionEngine::run`].
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Fittest chromosome of the final population, decoded.
    pub best: Chromosome,
    /// The evolved population.
    pub population: Population,
    /// Statistics from the run.
    pub stats: EvolutionStats,
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    functions: FunctionSet,
    hooks: EvolutionHooks,
    rng: GenomeRng,
    evaluations: u64,
}

impl EvolutionEngine {
    /// Create an engine with the built-in functions and hooks named by `config`.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let functions = FunctionSet::from_names(&config.function_set);
        let hooks = EvolutionHooks::from_config(&config);

        log::debug!(
            "Evolution engine: seed {seed}, strategy {:?}, mu {}, lambda {}, {}",
            config.strategy,
            config.mu,
            config.lambda,
            functions
        );

        Ok(Self {
            config,
            functions,
            hooks,
            rng: GenomeRng::new(seed),
            evaluations: 0,
        })
    }

    /// Replace the function set.
    pub fn with_functions(mut self, functions: FunctionSet) -> Self {
        self.functions = functions;
        self
    }

    /// Replace the hooks.
    pub fn with_hooks(mut self, hooks: EvolutionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[inline]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[inline]
    pub fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    /// Mutable access for registering caller functions before a run.
    #[inline]
    pub fn functions_mut(&mut self) -> &mut FunctionSet {
        &mut self.functions
    }

    /// Fitness evaluations performed so far.
    #[inline]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Random population sized by the configuration.
    pub fn initialise_population(&mut self) -> Result<Population, EvolutionError> {
        Ok(Population::random(
            &self.config,
            &self.functions,
            &mut self.rng,
        )?)
    }

    /// Evolve `population` against `data`.
    pub fn evolve(
        &mut self,
        population: &mut Population,
        data: &Dataset,
    ) -> Result<StopReason, EvolutionError> {
        self.evolve_with_callback(population, data, |_| {})
    }

    /// Evolve `population` against `data`, calling `callback` every
    /// `update_frequency` generations and when a solution is found.
    ///
    /// Each generation scores the children, pools them (ahead of the parents
    /// under the plus strategy), selects new parents, stops if the best parent
    /// has fitness zero or below, and otherwise reproduces. The number of
    /// generations run is recorded on the population.
    pub fn evolve_with_callback<F>(
        &mut self,
        population: &mut Population,
        data: &Dataset,
        mut callback: F,
    ) -> Result<StopReason, EvolutionError>
    where
        F: FnMut(&EvolutionProgress),
    {
        self.check_population(population)?;

        let Self {
            config,
            functions,
            hooks,
            rng,
            evaluations,
        } = self;
        let plus = config.strategy == EvolutionaryStrategy::Plus;
        let fitness = &*hooks.fitness;
        let (parents, children) = population.split_mut();

        if plus {
            evaluate_all(parents, fitness, functions, data, config.parallel_evaluation)?;
            *evaluations += parents.len() as u64;
        }

        let pool_parents: &[Chromosome] = if plus { &*parents } else { &[] };
        let mut candidates: Vec<Chromosome> =
            children.iter().chain(pool_parents).cloned().collect();

        let mut generation = 0;
        let stop_reason = loop {
            if generation >= config.generations {
                break StopReason::MaxGenerations;
            }

            evaluate_all(children, fitness, functions, data, config.parallel_evaluation)?;
            *evaluations += children.len() as u64;

            let pool_parents: &[Chromosome] = if plus { &*parents } else { &[] };
            for (slot, source) in candidates.iter_mut().zip(children.iter().chain(pool_parents)) {
                slot.copy_from(source)?;
            }

            hooks.selection.select(parents, &mut candidates)?;

            let best = &parents[0];
            let progress = EvolutionProgress {
                generation,
                total_generations: config.generations,
                best_fitness: best.fitness(),
                active_nodes: best.num_active_nodes(),
                solved: best.fitness() <= 0.0,
            };

            if progress.solved {
                log::info!(
                    "{generation}\t{} - Solution Found",
                    progress.best_fitness
                );
                callback(&progress);
                break StopReason::SolutionFound;
            }

            if generation % config.update_frequency == 0 {
                log::info!("{generation}\t{}", progress.best_fitness);
                callback(&progress);
            }

            let mut ctx = MutationContext {
                functions,
                mutation_rate: config.mutation_rate,
                weight_range: config.weight_range,
                rng: &mut *rng,
            };
            hooks
                .reproduction
                .reproduce(parents, children, &*hooks.mutation, &mut ctx)?;

            generation += 1;
        };

        population.set_trained_generations(generation);
        Ok(stop_reason)
    }

    /// Initialise a population, evolve it and return the fittest chromosome.
    pub fn run(&mut self, data: &Dataset) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(data, |_| {})
    }

    /// [`run`](Self::run) with a progress callback.
    pub fn run_with_callback<F>(
        &mut self,
        data: &Dataset,
        callback: F,
    ) -> Result<EvolutionResult, EvolutionError>
    where
        F: FnMut(&EvolutionProgress),
    {
        let start_time = Instant::now();
        let start_evaluations = self.evaluations;

        let mut population = self.initialise_population()?;
        let stop_reason = self.evolve_with_callback(&mut population, data, callback)?;

        let mut best = population
            .fittest()
            .cloned()
            .ok_or_else(|| EvolutionError::PopulationMismatch("population is empty".into()))?;
        best.set_active_nodes();

        let elapsed = start_time.elapsed().as_secs_f64();
        let total_evaluations = self.evaluations - start_evaluations;

        Ok(EvolutionResult {
            stats: EvolutionStats {
                generations: population.trained_generations().unwrap_or(0),
                total_evaluations,
                best_fitness: best.fitness(),
                elapsed_seconds: elapsed,
                evaluations_per_second: if elapsed > 0.0 {
                    total_evaluations as f64 / elapsed
                } else {
                    0.0
                },
                stop_reason,
            },
            best,
            population,
        })
    }

    fn check_population(&self, population: &Population) -> Result<(), EvolutionError> {
        if population.mu() != self.config.mu || population.lambda() != self.config.lambda {
            return Err(EvolutionError::PopulationMismatch(format!(
                "expected {} parents and {} children, found {} and {}",
                self.config.mu,
                self.config.lambda,
                population.mu(),
                population.lambda()
            )));
        }
        if let Some(c) = population
            .parents()
            .iter()
            .chain(population.children())
            .find(|c| *c.shape() != self.config.shape)
        {
            return Err(EvolutionError::PopulationMismatch(format!(
                "chromosome shape {:?} differs from configured {:?}",
                c.shape(),
                self.config.shape
            )));
        }
        Ok(())
    }
}

/// Decode and score one chromosome, storing its fitness.
fn evaluate(
    chromosome: &mut Chromosome,
    fitness: &dyn FitnessFunction,
    functions: &FunctionSet,
    data: &Dataset,
) -> Result<(), FitnessError> {
    chromosome.set_active_nodes();
    let score = fitness.score(chromosome, functions, data)?;
    chromosome.set_fitness(score);
    Ok(())
}

fn evaluate_all(
    chromosomes: &mut [Chromosome],
    fitness: &dyn FitnessFunction,
    functions: &FunctionSet,
    data: &Dataset,
    parallel: bool,
) -> Result<(), FitnessError> {
    if parallel {
        chromosomes
            .par_iter_mut()
            .try_for_each(|c| evaluate(c, fitness, functions, data))
    } else {
        chromosomes
            .iter_mut()
            .try_for_each(|c| evaluate(c, fitness, functions, data))
    }
}
