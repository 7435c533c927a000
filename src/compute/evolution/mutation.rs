//! Built-in mutation operators.

use crate::compute::{Chromosome, ChromosomeError};

use super::hooks::{MutationContext, MutationOperator};

/// Resamples every gene independently with probability `mutation_rate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilisticMutation;

impl MutationOperator for ProbabilisticMutation {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        ctx: &mut MutationContext<'_>,
    ) -> Result<(), ChromosomeError> {
        let shape = *chromosome.shape();
        let rate = ctx.mutation_rate;

        for (position, node) in chromosome.nodes_mut().iter_mut().enumerate() {
            if ctx.rng.chance(rate) {
                node.function = ctx.rng.random_function(ctx.functions)?;
            }
            for slot in 0..shape.arity {
                if ctx.rng.chance(rate) {
                    node.inputs[slot] = ctx.rng.random_connection(&shape, position);
                }
                if ctx.rng.chance(rate) {
                    node.weights[slot] = ctx.rng.random_weight(ctx.weight_range);
                }
            }
        }

        for gene in chromosome.output_genes_mut() {
            if ctx.rng.chance(rate) {
                *gene = ctx.rng.random_output(&shape);
            }
        }
        Ok(())
    }
}

/// Resamples a fixed number of randomly chosen genes:
/// `max(1, round(mutation_rate * total_genes))`.
///
/// A gene may be picked more than once per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointMutation;

impl PointMutation {
    /// Genes resampled per call for the given gene count and rate.
    pub fn num_mutations(num_genes: usize, mutation_rate: f32) -> usize {
        ((mutation_rate * num_genes as f32).round() as usize).max(1)
    }
}

impl MutationOperator for PointMutation {
    fn mutate(
        &self,
        chromosome: &mut Chromosome,
        ctx: &mut MutationContext<'_>,
    ) -> Result<(), ChromosomeError> {
        let shape = *chromosome.shape();
        let genes_per_node = 1 + 2 * shape.arity;
        let node_genes = shape.num_nodes * genes_per_node;
        let num_genes = shape.num_genes();

        for _ in 0..Self::num_mutations(num_genes, ctx.mutation_rate) {
            let gene = ctx.rng.index(num_genes);

            if gene >= node_genes {
                chromosome.output_genes_mut()[gene - node_genes] = ctx.rng.random_output(&shape);
                continue;
            }

            let position = gene / genes_per_node;
            let node = &mut chromosome.nodes_mut()[position];
            match gene % genes_per_node {
                0 => node.function = ctx.rng.random_function(ctx.functions)?,
                offset if offset <= shape.arity => {
                    node.inputs[offset - 1] = ctx.rng.random_connection(&shape, position);
                }
                offset => {
                    node.weights[offset - 1 - shape.arity] = ctx.rng.random_weight(ctx.weight_range);
                }
            }
        }
        Ok(())
    }
}
