//! Random gene sampling.
//!
//! Initial construction and every mutation operator draw genes through the
//! same [`GenomeRng`] methods, so a connection gene can never point at its
//! own node or any later node no matter which path produced it.

use rand::prelude::*;

use crate::schema::ChromosomeShape;

use super::chromosome::ChromosomeError;
use super::functions::FunctionSet;

/// Random number generator wrapper for gene sampling.
#[derive(Debug, Clone)]
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Connection gene for the node at `position`: uniform over
    /// `[0, num_inputs + position)`.
    #[inline]
    pub fn random_connection(&mut self, shape: &ChromosomeShape, position: usize) -> usize {
        self.rng.gen_range(0..shape.num_inputs + position)
    }

    /// Output gene: uniform over every input and every node.
    #[inline]
    pub fn random_output(&mut self, shape: &ChromosomeShape) -> usize {
        self.rng.gen_range(0..shape.address_space())
    }

    /// Function gene: uniform over the registered functions.
    pub fn random_function(&mut self, functions: &FunctionSet) -> Result<usize, ChromosomeError> {
        if functions.is_empty() {
            return Err(ChromosomeError::EmptyFunctionSet);
        }
        Ok(self.rng.gen_range(0..functions.len()))
    }

    /// Weight gene: uniform over `[-range, range]`.
    #[inline]
    pub fn random_weight(&mut self, range: f32) -> f32 {
        self.rng.gen_range(-range..=range)
    }

    /// Bernoulli trial. A probability of 0 never succeeds, 1 always does.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.r#gen::<f32>() < probability
    }

    /// Uniform index in `[0, len)`.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> ChromosomeShape {
        ChromosomeShape {
            num_inputs: 3,
            num_nodes: 20,
            num_outputs: 2,
            arity: 2,
        }
    }

    #[test]
    fn test_connection_respects_position() {
        let mut rng = GenomeRng::new(42);
        let shape = shape();
        for position in 0..shape.num_nodes {
            for _ in 0..50 {
                assert!(rng.random_connection(&shape, position) < shape.num_inputs + position);
            }
        }
    }

    #[test]
    fn test_output_covers_address_space() {
        let mut rng = GenomeRng::new(7);
        let shape = shape();
        let mut seen = vec![false; shape.address_space()];
        for _ in 0..5000 {
            seen[rng.random_output(&shape)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_empty_function_set_is_an_error() {
        let mut rng = GenomeRng::new(1);
        assert_eq!(
            rng.random_function(&FunctionSet::new()),
            Err(ChromosomeError::EmptyFunctionSet)
        );
        let set = FunctionSet::from_names("add,sub");
        assert!(rng.random_function(&set).unwrap() < 2);
    }

    #[test]
    fn test_weight_within_range() {
        let mut rng = GenomeRng::new(3);
        for _ in 0..1000 {
            let w = rng.random_weight(2.5);
            assert!((-2.5..=2.5).contains(&w));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = GenomeRng::new(9);
        assert!((0..1000).all(|_| !rng.chance(0.0)));
        assert!((0..1000).all(|_| rng.chance(1.0)));
    }

    #[test]
    fn test_seeded_determinism() {
        let shape = shape();
        let mut a = GenomeRng::new(123);
        let mut b = GenomeRng::new(123);
        for position in 0..shape.num_nodes {
            assert_eq!(
                a.random_connection(&shape, position),
                b.random_connection(&shape, position)
            );
            assert_eq!(a.index(1000), b.index(1000));
            assert_eq!(a.random_weight(1.0), b.random_weight(1.0));
        }
    }
}
