//! Cartesian genotype: node graph, active-node decoding and execution.
//!
//! Inputs and nodes share one flat address space `[0, num_inputs + num_nodes)`.
//! Addresses below `num_inputs` read a primary input; the rest read the output
//! of node `address - num_inputs`. A node at position `p` may only connect to
//! addresses below `num_inputs + p`, so the graph is feed-forward by
//! construction and ascending node order is always a valid evaluation order.
//!
//! Evaluation is split in two phases. [`Chromosome::set_active_nodes`] decodes
//! the genes once, then [`Chromosome::execute`] may be called for any number of
//! input vectors (e.g. every dataset row) without decoding again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Address, ChromosomeShape};

use super::functions::FunctionSet;
use super::rng::GenomeRng;

/// Fitness of a chromosome that has not been evaluated yet.
pub const UNSET_FITNESS: f32 = f32::INFINITY;

/// Chromosome construction and execution errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChromosomeError {
    #[error("Function set is empty; cannot assign a function gene")]
    EmptyFunctionSet,
    #[error("Invalid chromosome shape: {0}")]
    InvalidShape(String),
    #[error("Chromosome shapes differ: expected {expected:?}, found {found:?}")]
    IncompatibleShape {
        expected: ChromosomeShape,
        found: ChromosomeShape,
    },
    #[error("Expected {expected} input values, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },
    #[error("Invalid gene: {0}")]
    InvalidGene(String),
    #[error("No parents to reproduce from")]
    NoParents,
}

/// A function node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index into the function set.
    pub function: usize,
    /// Connection genes (flat addresses), one per arity slot.
    pub inputs: Vec<usize>,
    /// Weight genes, parallel to `inputs`.
    pub weights: Vec<f32>,
    /// Whether the node influences an output, as of the last decode.
    #[serde(default)]
    pub active: bool,
    /// Output cached by the last execution.
    #[serde(skip)]
    pub output: f32,
}

impl Node {
    /// Create a node from its genes.
    pub fn new(function: usize, inputs: Vec<usize>, weights: Vec<f32>) -> Self {
        Self {
            function,
            inputs,
            weights,
            active: false,
            output: 0.0,
        }
    }

    /// Random node at `position`.
    fn random(
        shape: &ChromosomeShape,
        position: usize,
        functions: &FunctionSet,
        weight_range: f32,
        rng: &mut GenomeRng,
    ) -> Result<Self, ChromosomeError> {
        let function = rng.random_function(functions)?;
        let mut inputs = Vec::with_capacity(shape.arity);
        let mut weights = Vec::with_capacity(shape.arity);
        for _ in 0..shape.arity {
            inputs.push(rng.random_connection(shape, position));
            weights.push(rng.random_weight(weight_range));
        }
        Ok(Self::new(function, inputs, weights))
    }
}

/// A CGP genotype.
///
/// Deserialization goes through [`Chromosome::from_parts`], so stored genes
/// are checked and the active nodes are recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ChromosomeRecord")]
pub struct Chromosome {
    shape: ChromosomeShape,
    nodes: Vec<Node>,
    output_genes: Vec<usize>,
    /// Active node positions, ascending.
    active_nodes: Vec<usize>,
    #[serde(default = "unset_fitness", skip_serializing_if = "is_unset")]
    fitness: f32,
    /// Outputs of the last execution.
    #[serde(skip)]
    output_values: Vec<f32>,
    /// Gathered connection values of the node being evaluated.
    #[serde(skip)]
    node_inputs: Vec<f32>,
}

impl Chromosome {
    /// Create a random chromosome.
    ///
    /// Fails if the shape has a zero dimension or the function set is empty.
    pub fn random(
        shape: ChromosomeShape,
        functions: &FunctionSet,
        weight_range: f32,
        rng: &mut GenomeRng,
    ) -> Result<Self, ChromosomeError> {
        validate_shape(&shape)?;
        if functions.is_empty() {
            return Err(ChromosomeError::EmptyFunctionSet);
        }

        let nodes = (0..shape.num_nodes)
            .map(|position| Node::random(&shape, position, functions, weight_range, rng))
            .collect::<Result<Vec<_>, _>>()?;
        let output_genes = (0..shape.num_outputs)
            .map(|_| rng.random_output(&shape))
            .collect();

        let mut chromosome = Self::with_genes(shape, nodes, output_genes);
        chromosome.set_active_nodes();
        Ok(chromosome)
    }

    /// Build a chromosome from explicit genes, checking every structural
    /// constraint. The result is already decoded.
    pub fn from_parts(
        shape: ChromosomeShape,
        nodes: Vec<Node>,
        output_genes: Vec<usize>,
    ) -> Result<Self, ChromosomeError> {
        validate_shape(&shape)?;
        let mut chromosome = Self::with_genes(shape, nodes, output_genes);
        chromosome.validate()?;
        chromosome.set_active_nodes();
        Ok(chromosome)
    }

    fn with_genes(shape: ChromosomeShape, nodes: Vec<Node>, output_genes: Vec<usize>) -> Self {
        Self {
            shape,
            nodes,
            output_genes,
            active_nodes: Vec::with_capacity(shape.num_nodes),
            fitness: UNSET_FITNESS,
            output_values: vec![0.0; shape.num_outputs],
            node_inputs: Vec::with_capacity(shape.arity),
        }
    }

    /// Check gene counts and the feed-forward connection constraint.
    pub fn validate(&self) -> Result<(), ChromosomeError> {
        let shape = &self.shape;
        if self.nodes.len() != shape.num_nodes {
            return Err(ChromosomeError::InvalidGene(format!(
                "expected {} nodes, found {}",
                shape.num_nodes,
                self.nodes.len()
            )));
        }
        if self.output_genes.len() != shape.num_outputs {
            return Err(ChromosomeError::InvalidGene(format!(
                "expected {} output genes, found {}",
                shape.num_outputs,
                self.output_genes.len()
            )));
        }

        for (position, node) in self.nodes.iter().enumerate() {
            if node.inputs.len() != shape.arity || node.weights.len() != shape.arity {
                return Err(ChromosomeError::InvalidGene(format!(
                    "node {position} has {} connections and {} weights, arity is {}",
                    node.inputs.len(),
                    node.weights.len(),
                    shape.arity
                )));
            }
            let limit = shape.node_address(position);
            if let Some(&bad) = node.inputs.iter().find(|&&a| a >= limit) {
                return Err(ChromosomeError::InvalidGene(format!(
                    "node {position} connects to address {bad}; must be below {limit}"
                )));
            }
        }

        if let Some(&bad) = self
            .output_genes
            .iter()
            .find(|&&a| a >= shape.address_space())
        {
            return Err(ChromosomeError::InvalidGene(format!(
                "output gene {bad} is outside the address space ({})",
                shape.address_space()
            )));
        }
        Ok(())
    }

    /// Structural dimensions.
    #[inline]
    pub fn shape(&self) -> &ChromosomeShape {
        &self.shape
    }

    /// Whether `other` may be copied into this chromosome.
    #[inline]
    pub fn is_compatible(&self, other: &Chromosome) -> bool {
        self.shape == other.shape
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to the nodes for mutation operators.
    ///
    /// Callers must keep connection genes below `num_inputs + position` and
    /// re-decode before executing.
    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    #[inline]
    pub fn output_genes(&self) -> &[usize] {
        &self.output_genes
    }

    /// Mutable access to the output genes. Values must stay inside the address space.
    #[inline]
    pub fn output_genes_mut(&mut self) -> &mut [usize] {
        &mut self.output_genes
    }

    /// Active node positions in ascending order, as of the last decode.
    #[inline]
    pub fn active_nodes(&self) -> &[usize] {
        &self.active_nodes
    }

    #[inline]
    pub fn num_active_nodes(&self) -> usize {
        self.active_nodes.len()
    }

    /// Fitness (error); lower is better. [`UNSET_FITNESS`] until evaluated.
    #[inline]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[inline]
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Whether a fitness has been assigned.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness != UNSET_FITNESS
    }

    /// Outputs produced by the last execution.
    #[inline]
    pub fn outputs(&self) -> &[f32] {
        &self.output_values
    }

    /// Overwrite this chromosome with the genes, active nodes and fitness of
    /// `source`, reusing existing allocations.
    pub fn copy_from(&mut self, source: &Chromosome) -> Result<(), ChromosomeError> {
        if !self.is_compatible(source) {
            return Err(ChromosomeError::IncompatibleShape {
                expected: self.shape,
                found: source.shape,
            });
        }

        for (dest, src) in self.nodes.iter_mut().zip(&source.nodes) {
            dest.function = src.function;
            dest.inputs.copy_from_slice(&src.inputs);
            dest.weights.copy_from_slice(&src.weights);
            dest.active = src.active;
        }
        self.output_genes.copy_from_slice(&source.output_genes);
        self.active_nodes.clone_from(&source.active_nodes);
        self.fitness = source.fitness;
        Ok(())
    }

    /// Recompute which nodes influence at least one output.
    ///
    /// Walks back from every output gene that addresses a node, marking each
    /// node once and following its node connections. The resulting positions
    /// are sorted ascending, which is a valid evaluation order because every
    /// connection points at a lower address.
    pub fn set_active_nodes(&mut self) {
        let Self {
            shape,
            nodes,
            output_genes,
            active_nodes,
            ..
        } = self;

        for node in nodes.iter_mut() {
            node.active = false;
        }
        active_nodes.clear();

        let mut stack = Vec::new();
        for &gene in output_genes.iter() {
            let Address::Node(start) = shape.resolve(gene) else {
                continue;
            };
            stack.push(start);

            while let Some(position) = stack.pop() {
                let node = &mut nodes[position];
                if node.active {
                    continue;
                }
                node.active = true;
                active_nodes.push(position);

                for &address in &nodes[position].inputs {
                    if let Address::Node(next) = shape.resolve(address)
                        && !nodes[next].active
                    {
                        stack.push(next);
                    }
                }
            }
        }

        active_nodes.sort_unstable();
    }

    /// Execute the decoded chromosome on one input vector.
    ///
    /// Evaluates active nodes in ascending order, caching each result on its
    /// node, then resolves every output gene. Infinite node results are clamped
    /// to `f32::MAX` / `f32::MIN` and NaN results are replaced with zero.
    pub fn execute(
        &mut self,
        functions: &FunctionSet,
        inputs: &[f32],
    ) -> Result<&[f32], ChromosomeError> {
        let Self {
            shape,
            nodes,
            output_genes,
            active_nodes,
            output_values,
            node_inputs,
            ..
        } = self;

        if inputs.len() != shape.num_inputs {
            return Err(ChromosomeError::InputCountMismatch {
                expected: shape.num_inputs,
                actual: inputs.len(),
            });
        }

        for &position in active_nodes.iter() {
            node_inputs.clear();
            for &address in &nodes[position].inputs {
                node_inputs.push(match shape.resolve(address) {
                    Address::Input(i) => inputs[i],
                    Address::Node(n) => nodes[n].output,
                });
            }

            let node = &nodes[position];
            let function = functions.get(node.function).ok_or_else(|| {
                ChromosomeError::InvalidGene(format!(
                    "node {position} uses function {} but only {} are registered",
                    node.function,
                    functions.len()
                ))
            })?;
            let output = sanitize_output(function.call(node_inputs.as_slice(), &node.weights));
            nodes[position].output = output;
        }

        output_values.resize(shape.num_outputs, 0.0);
        for (value, &gene) in output_values.iter_mut().zip(output_genes.iter()) {
            *value = match shape.resolve(gene) {
                Address::Input(i) => inputs[i],
                Address::Node(n) => nodes[n].output,
            };
        }

        Ok(output_values.as_slice())
    }

    /// Human-readable listing of the chromosome using function names from `functions`.
    pub fn display<'a>(&'a self, functions: &'a FunctionSet) -> ChromosomeDisplay<'a> {
        ChromosomeDisplay {
            chromosome: self,
            functions,
        }
    }
}

/// Serialized genes of a [`Chromosome`]. Decoded state is ignored.
#[derive(Deserialize)]
struct ChromosomeRecord {
    shape: ChromosomeShape,
    nodes: Vec<Node>,
    output_genes: Vec<usize>,
    #[serde(default = "unset_fitness")]
    fitness: f32,
}

impl TryFrom<ChromosomeRecord> for Chromosome {
    type Error = ChromosomeError;

    fn try_from(record: ChromosomeRecord) -> Result<Self, Self::Error> {
        let mut chromosome = Self::from_parts(record.shape, record.nodes, record.output_genes)?;
        chromosome.fitness = record.fitness;
        Ok(chromosome)
    }
}

fn validate_shape(shape: &ChromosomeShape) -> Result<(), ChromosomeError> {
    shape
        .validate()
        .map_err(|e| ChromosomeError::InvalidShape(e.to_string()))
}

fn unset_fitness() -> f32 {
    UNSET_FITNESS
}

fn is_unset(fitness: &f32) -> bool {
    *fitness == UNSET_FITNESS
}

/// Keep node outputs finite.
#[inline]
fn sanitize_output(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else if value.is_infinite() {
        if value > 0.0 { f32::MAX } else { f32::MIN }
    } else {
        value
    }
}

/// [`fmt::Display`] adapter returned by [`Chromosome::display`].
///
/// Active markers reflect the last decode.
pub struct ChromosomeDisplay<'a> {
    chromosome: &'a Chromosome,
    functions: &'a FunctionSet,
}

impl fmt::Display for ChromosomeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chromosome = self.chromosome;
        let shape = &chromosome.shape;

        for i in 0..shape.num_inputs {
            writeln!(f, "({i}):\tinput")?;
        }

        for (position, node) in chromosome.nodes.iter().enumerate() {
            write!(
                f,
                "({}):\t{}\t",
                shape.node_address(position),
                self.functions.name(node.function)
            )?;
            for (input, weight) in node.inputs.iter().zip(&node.weights) {
                write!(f, "{input},{weight:+.1}\t")?;
            }
            if node.active {
                write!(f, "*")?;
            }
            writeln!(f)?;
        }

        write!(f, "outputs:")?;
        for gene in &chromosome.output_genes {
            write!(f, " {gene}")?;
        }
        writeln!(f)
    }
}
