//! Built-in fitness functions.

use crate::compute::{Chromosome, ChromosomeError, FunctionSet};
use crate::schema::Dataset;

use super::hooks::FitnessFunction;

/// Fitness scoring errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitnessError {
    #[error("Chromosome has {chromosome} inputs but the dataset has {dataset}")]
    InputMismatch { chromosome: usize, dataset: usize },
    #[error("Chromosome has {chromosome} outputs but the dataset has {dataset}")]
    OutputMismatch { chromosome: usize, dataset: usize },
    #[error(transparent)]
    Chromosome(#[from] ChromosomeError),
}

/// Sum of absolute differences between produced and expected outputs over
/// every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupervisedLearning;

impl FitnessFunction for SupervisedLearning {
    fn score(
        &self,
        chromosome: &mut Chromosome,
        functions: &FunctionSet,
        data: &Dataset,
    ) -> Result<f32, FitnessError> {
        let shape = *chromosome.shape();
        if shape.num_inputs != data.num_inputs() {
            return Err(FitnessError::InputMismatch {
                chromosome: shape.num_inputs,
                dataset: data.num_inputs(),
            });
        }
        if shape.num_outputs != data.num_outputs() {
            return Err(FitnessError::OutputMismatch {
                chromosome: shape.num_outputs,
                dataset: data.num_outputs(),
            });
        }

        let mut error = 0.0f32;
        for (inputs, expected) in data.samples() {
            let outputs = chromosome.execute(functions, inputs)?;
            error += outputs
                .iter()
                .zip(expected)
                .map(|(actual, target)| (actual - target).abs())
                .sum::<f32>();
        }
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Node;
    use crate::schema::ChromosomeShape;

    fn adder() -> Chromosome {
        let shape = ChromosomeShape {
            num_inputs: 2,
            num_nodes: 1,
            num_outputs: 1,
            arity: 2,
        };
        Chromosome::from_parts(shape, vec![Node::new(0, vec![0, 1], vec![0.0, 0.0])], vec![2])
            .unwrap()
    }

    #[test]
    fn test_perfect_solution_scores_zero() {
        let data = Dataset::from_arrays(2, 1, 3, &[1.0, 2.0, 3.0, 4.0, -1.0, 1.0], &[3.0, 7.0, 0.0])
            .unwrap();
        let functions = FunctionSet::from_names("add");
        let fitness = SupervisedLearning
            .score(&mut adder(), &functions, &data)
            .unwrap();
        assert_eq!(fitness, 0.0);
    }

    #[test]
    fn test_sums_absolute_error() {
        let data = Dataset::from_arrays(2, 1, 2, &[1.0, 2.0, 3.0, 4.0], &[4.0, 5.0]).unwrap();
        let functions = FunctionSet::from_names("add");
        let fitness = SupervisedLearning
            .score(&mut adder(), &functions, &data)
            .unwrap();
        assert_eq!(fitness, 3.0);
    }

    #[test]
    fn test_arity_mismatch() {
        let functions = FunctionSet::from_names("add");
        let inputs = Dataset::from_arrays(3, 1, 1, &[1.0, 2.0, 3.0], &[0.0]).unwrap();
        assert_eq!(
            SupervisedLearning.score(&mut adder(), &functions, &inputs),
            Err(FitnessError::InputMismatch {
                chromosome: 2,
                dataset: 3
            })
        );

        let outputs = Dataset::from_arrays(2, 2, 1, &[1.0, 2.0], &[0.0, 0.0]).unwrap();
        assert!(matches!(
            SupervisedLearning.score(&mut adder(), &functions, &outputs),
            Err(FitnessError::OutputMismatch { .. })
        ));
    }
}
