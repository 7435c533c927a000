//! Clone-then-mutate reproduction.

use crate::compute::{Chromosome, ChromosomeError};

use super::hooks::{MutationContext, MutationOperator, ReproductionScheme};

/// Each child becomes a mutated copy of a uniformly chosen parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutateRandomParent;

impl ReproductionScheme for MutateRandomParent {
    fn reproduce(
        &self,
        parents: &[Chromosome],
        children: &mut [Chromosome],
        mutation: &dyn MutationOperator,
        ctx: &mut MutationContext<'_>,
    ) -> Result<(), ChromosomeError> {
        if parents.is_empty() {
            return Err(ChromosomeError::NoParents);
        }
        for child in children.iter_mut() {
            let parent = &parents[ctx.rng.index(parents.len())];
            child.copy_from(parent)?;
            mutation.mutate(child, ctx)?;
        }
        Ok(())
    }
}
