//! Parent and child chromosomes of a run.

use serde::{Deserialize, Serialize};

use crate::compute::{Chromosome, ChromosomeError, FunctionSet, GenomeRng};
use crate::schema::EvolutionConfig;

/// `mu` parents and `lambda` children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    parents: Vec<Chromosome>,
    children: Vec<Chromosome>,
    /// Generations run by the last evolution, `None` before any run.
    trained_generations: Option<usize>,
}

impl Population {
    /// Random parents and children sized by the configuration.
    pub fn random(
        config: &EvolutionConfig,
        functions: &FunctionSet,
        rng: &mut GenomeRng,
    ) -> Result<Self, ChromosomeError> {
        let mut random = |count: usize| {
            (0..count)
                .map(|_| Chromosome::random(config.shape, functions, config.weight_range, rng))
                .collect::<Result<Vec<_>, _>>()
        };
        let parents = random(config.mu)?;
        let children = random(config.lambda)?;

        Ok(Self {
            parents,
            children,
            trained_generations: None,
        })
    }

    #[inline]
    pub fn parents(&self) -> &[Chromosome] {
        &self.parents
    }

    #[inline]
    pub fn children(&self) -> &[Chromosome] {
        &self.children
    }

    #[inline]
    pub fn mu(&self) -> usize {
        self.parents.len()
    }

    #[inline]
    pub fn lambda(&self) -> usize {
        self.children.len()
    }

    /// Generations run by the last evolution.
    #[inline]
    pub fn trained_generations(&self) -> Option<usize> {
        self.trained_generations
    }

    pub(crate) fn set_trained_generations(&mut self, generations: usize) {
        self.trained_generations = Some(generations);
    }

    pub(crate) fn split_mut(&mut self) -> (&mut [Chromosome], &mut [Chromosome]) {
        (&mut self.parents, &mut self.children)
    }

    /// Fittest chromosome over the parents, then the children. Ties keep the
    /// earlier one.
    pub fn fittest(&self) -> Option<&Chromosome> {
        self.parents
            .iter()
            .chain(&self.children)
            .reduce(|best, c| if c.fitness() < best.fitness() { c } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_population_sizes() {
        let mut config = EvolutionConfig::new(2, 8, 1, 2);
        config.mu = 3;
        config.lambda = 5;
        let functions = FunctionSet::from_names("add,sub");
        let mut rng = GenomeRng::new(2);

        let population = Population::random(&config, &functions, &mut rng).unwrap();
        assert_eq!(population.mu(), 3);
        assert_eq!(population.lambda(), 5);
        assert_eq!(population.trained_generations(), None);
        assert!(population.parents().iter().all(|c| !c.is_evaluated()));
    }

    #[test]
    fn test_fittest_prefers_earliest_tie() {
        let mut config = EvolutionConfig::new(2, 8, 1, 2);
        config.mu = 2;
        config.lambda = 2;
        let functions = FunctionSet::from_names("add");
        let mut rng = GenomeRng::new(3);
        let mut population = Population::random(&config, &functions, &mut rng).unwrap();

        let (parents, children) = population.split_mut();
        parents[0].set_fitness(4.0);
        parents[1].set_fitness(2.0);
        children[0].set_fitness(2.0);
        children[1].set_fitness(3.0);
        let expected = parents[1].nodes().to_vec();

        let best = population.fittest().unwrap();
        assert_eq!(best.fitness(), 2.0);
        assert_eq!(best.nodes(), expected.as_slice());
    }

    #[test]
    fn test_deserialize_validates_chromosomes() {
        let config = EvolutionConfig::new(2, 8, 1, 2);
        let functions = FunctionSet::from_names("add");
        let mut rng = GenomeRng::new(4);
        let population = Population::random(&config, &functions, &mut rng).unwrap();

        let mut value = serde_json::to_value(&population).unwrap();
        let restored: Population = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(restored.mu(), 1);
        assert_eq!(restored.lambda(), 4);

        value["parents"][0]["nodes"][0]["inputs"][0] = serde_json::json!(999);
        assert!(serde_json::from_value::<Population>(value).is_err());
    }

    #[test]
    fn test_empty_function_set_fails() {
        let config = EvolutionConfig::new(2, 8, 1, 2);
        let mut rng = GenomeRng::new(3);
        assert_eq!(
            Population::random(&config, &FunctionSet::new(), &mut rng).unwrap_err(),
            ChromosomeError::EmptyFunctionSet
        );
    }
}
