//! Truncation selection.

use crate::compute::{Chromosome, ChromosomeError};

use super::hooks::SelectionScheme;

/// Copies the `parents.len()` fittest candidates into the parent slots.
///
/// The first candidate is swapped with the last before a stable ascending
/// sort, so among equally fit candidates the first slot never wins by
/// position alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickHighest;

impl SelectionScheme for PickHighest {
    fn select(
        &self,
        parents: &mut [Chromosome],
        candidates: &mut [Chromosome],
    ) -> Result<(), ChromosomeError> {
        sort_candidates(candidates);
        for (parent, candidate) in parents.iter_mut().zip(candidates.iter()) {
            parent.copy_from(candidate)?;
        }
        Ok(())
    }
}

/// Swap first and last, then stable-sort ascending by fitness.
pub fn sort_candidates(candidates: &mut [Chromosome]) {
    if let Some(last) = candidates.len().checked_sub(1) {
        candidates.swap(0, last);
    }
    candidates.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{FunctionSet, GenomeRng};
    use crate::schema::ChromosomeShape;

    fn pool(fitness: &[f32]) -> Vec<Chromosome> {
        let shape = ChromosomeShape {
            num_inputs: 1,
            num_nodes: 4,
            num_outputs: 1,
            arity: 2,
        };
        let functions = FunctionSet::from_names("add");
        let mut rng = GenomeRng::new(0);
        fitness
            .iter()
            .map(|&f| {
                let mut c = Chromosome::random(shape, &functions, 1.0, &mut rng).unwrap();
                c.set_fitness(f);
                c
            })
            .collect()
    }

    #[test]
    fn test_sort_swaps_first_and_last() {
        let mut candidates = pool(&[1.0, 1.0, 1.0]);
        let first = candidates[0].output_genes().to_vec();
        let last = candidates[2].output_genes().to_vec();
        let marker = |c: &Chromosome| c.nodes()[3].weights.clone();
        let (m0, m1, m2) = (marker(&candidates[0]), marker(&candidates[1]), marker(&candidates[2]));

        sort_candidates(&mut candidates);
        assert_eq!(marker(&candidates[0]), m2);
        assert_eq!(marker(&candidates[1]), m1);
        assert_eq!(marker(&candidates[2]), m0);
        assert_eq!(candidates[0].output_genes(), last.as_slice());
        assert_eq!(candidates[2].output_genes(), first.as_slice());
    }

    #[test]
    fn test_selects_fittest() {
        let mut candidates = pool(&[5.0, 2.0, 9.0, 0.5, 3.0]);
        let mut parents = pool(&[f32::INFINITY, f32::INFINITY]);

        PickHighest.select(&mut parents, &mut candidates).unwrap();
        assert_eq!(parents[0].fitness(), 0.5);
        assert_eq!(parents[1].fitness(), 2.0);
    }

    #[test]
    fn test_stable_among_ties() {
        // After the swap the order is [c, b, a]; all tie, so c wins.
        let mut candidates = pool(&[1.0, 1.0, 1.0]);
        let expected = candidates[2].nodes()[3].weights.clone();
        let mut parents = pool(&[f32::INFINITY]);

        PickHighest.select(&mut parents, &mut candidates).unwrap();
        assert_eq!(parents[0].nodes()[3].weights, expected);
    }

    #[test]
    fn test_unevaluated_sort_last() {
        let mut candidates = pool(&[f32::INFINITY, 4.0, 1.0]);
        sort_candidates(&mut candidates);
        let order: Vec<f32> = candidates.iter().map(Chromosome::fitness).collect();
        assert_eq!(order, vec![1.0, 4.0, f32::INFINITY]);
    }
}
