//! Node function registry for CGP chromosomes.
//!
//! Every node carries a function gene that indexes into a [`FunctionSet`].
//! A node function receives the gathered values of all its connections
//! together with the node's connection weights and returns a single value.
//! The arity is implied by the slice length, so every function must accept
//! any arity of at least one.

use std::fmt;
use std::sync::Arc;

/// Maximum number of functions a [`FunctionSet`] can hold.
pub const MAX_FUNCTIONS: usize = 50;

/// Signature shared by built-in and caller-supplied node functions.
///
/// `inputs` and `weights` always have the same length (the chromosome arity).
pub type NodeFn = Arc<dyn Fn(&[f32], &[f32]) -> f32 + Send + Sync>;

/// Function registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FunctionSetError {
    #[error("Function '{0}' is not known")]
    UnknownFunction(String),
    #[error("Function set has reached maximum capacity ({capacity}); function '{name}' not added")]
    CapacityExceeded { capacity: usize, name: String },
}

/// Built-in node functions.
///
/// Arithmetic functions reduce over all inputs. Logical functions treat an
/// input exactly equal to `1.0` as true and exactly equal to `0.0` as false;
/// any other value is neither, matching the literal comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    /// Sum of all inputs.
    Add,
    /// First input minus every remaining input.
    Sub,
    /// Product of all inputs.
    Mul,
    /// First input divided by every remaining input (unguarded).
    Div,
    /// 1 unless some input is 0.
    And,
    /// 0 unless some input is 0.
    Nand,
    /// 1 if some input is 1.
    Or,
    /// 0 if some input is 1.
    Nor,
    /// 1 iff exactly one input is 1.
    Xor,
    /// 0 iff exactly one input is 1.
    Xnor,
    /// 1 if the first input is 0, else 0.
    Not,
}

impl BuiltinFunction {
    /// All built-in functions, in registration-name order.
    pub const ALL: [Self; 11] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::And,
        Self::Nand,
        Self::Or,
        Self::Nor,
        Self::Xor,
        Self::Xnor,
        Self::Not,
    ];

    /// Name used to request this function in a function-set string.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::And => "and",
            Self::Nand => "nand",
            Self::Or => "or",
            Self::Nor => "nor",
            Self::Xor => "xor",
            Self::Xnor => "xnor",
            Self::Not => "not",
        }
    }

    /// Look up a built-in by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Apply this function. Weights are accepted for signature compatibility;
    /// none of the built-ins use them.
    #[inline]
    pub fn apply(self, inputs: &[f32], _weights: &[f32]) -> f32 {
        match self {
            Self::Add => inputs.iter().sum(),
            Self::Sub => fold_first(inputs, |acc, x| acc - x),
            Self::Mul => inputs.iter().product(),
            Self::Div => fold_first(inputs, |acc, x| acc / x),
            Self::And => bool_to_f32(!inputs.contains(&0.0)),
            Self::Nand => bool_to_f32(inputs.contains(&0.0)),
            Self::Or => bool_to_f32(inputs.contains(&1.0)),
            Self::Nor => bool_to_f32(!inputs.contains(&1.0)),
            Self::Xor => bool_to_f32(count_ones(inputs) == 1),
            Self::Xnor => bool_to_f32(count_ones(inputs) != 1),
            Self::Not => bool_to_f32(inputs.first() == Some(&0.0)),
        }
    }
}

fn fold_first(inputs: &[f32], f: impl Fn(f32, f32) -> f32) -> f32 {
    match inputs.split_first() {
        Some((&first, rest)) => rest.iter().fold(first, |acc, &x| f(acc, x)),
        None => 0.0,
    }
}

fn count_ones(inputs: &[f32]) -> usize {
    inputs.iter().filter(|&&x| x == 1.0).count()
}

#[inline]
fn bool_to_f32(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// A named entry in a [`FunctionSet`].
#[derive(Clone)]
pub struct NodeFunction {
    name: String,
    function: NodeFn,
}

impl NodeFunction {
    /// Display name of the function.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the function.
    #[inline]
    pub fn call(&self, inputs: &[f32], weights: &[f32]) -> f32 {
        (self.function)(inputs, weights)
    }
}

impl fmt::Debug for NodeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered registry of node functions; a function gene is an index into it.
#[derive(Debug, Clone, Default)]
pub struct FunctionSet {
    functions: Vec<NodeFunction>,
}

impl FunctionSet {
    /// Create an empty function set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a function set from comma-separated built-in names, e.g. `"add,sub"`.
    ///
    /// Unknown names are skipped with a warning.
    pub fn from_names(names: &str) -> Self {
        let mut set = Self::new();
        set.add_named(names);
        set
    }

    /// Register a caller-supplied function, returning its slot index.
    pub fn register<F>(&mut self, name: &str, function: F) -> Result<usize, FunctionSetError>
    where
        F: Fn(&[f32], &[f32]) -> f32 + Send + Sync + 'static,
    {
        self.push(name, Arc::new(function))
    }

    /// Register a built-in function by name, returning its slot index.
    pub fn add_builtin(&mut self, name: &str) -> Result<usize, FunctionSetError> {
        let builtin = BuiltinFunction::from_name(name)
            .ok_or_else(|| FunctionSetError::UnknownFunction(name.to_string()))?;
        self.push(builtin.name(), Arc::new(move |i: &[f32], w: &[f32]| builtin.apply(i, w)))
    }

    /// Add every built-in named in a comma-separated list.
    ///
    /// Failures are reported and skipped. Returns how many functions were added.
    pub fn add_named(&mut self, names: &str) -> usize {
        let mut added = 0;
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match self.add_builtin(name) {
                Ok(_) => added += 1,
                Err(e) => log::warn!("{e}; skipping"),
            }
        }

        if self.is_empty() {
            log::warn!("No functions added to function set");
        }
        added
    }

    fn push(&mut self, name: &str, function: NodeFn) -> Result<usize, FunctionSetError> {
        if self.functions.len() >= MAX_FUNCTIONS {
            return Err(FunctionSetError::CapacityExceeded {
                capacity: MAX_FUNCTIONS,
                name: name.to_string(),
            });
        }
        self.functions.push(NodeFunction {
            name: name.to_string(),
            function,
        });
        Ok(self.functions.len() - 1)
    }

    /// Find the slot of a registered function by name.
    pub fn lookup(&self, name: &str) -> Result<usize, FunctionSetError> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| FunctionSetError::UnknownFunction(name.to_string()))
    }

    /// Remove every registered function.
    pub fn clear(&mut self) {
        self.functions.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Get a function by slot.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&NodeFunction> {
        self.functions.get(index)
    }

    /// Name of the function in the given slot, or `"?"` for an unknown slot.
    pub fn name(&self, index: usize) -> &str {
        self.get(index).map_or("?", NodeFunction::name)
    }

    /// Iterate registered functions in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeFunction> {
        self.functions.iter()
    }
}

impl fmt::Display for FunctionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Functions ({}):", self.len())?;
        for function in &self.functions {
            write!(f, " {}", function.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_reductions() {
        let inputs = [8.0, 2.0, 2.0];
        let weights = [0.0; 3];
        assert_eq!(BuiltinFunction::Add.apply(&inputs, &weights), 12.0);
        assert_eq!(BuiltinFunction::Sub.apply(&inputs, &weights), 4.0);
        assert_eq!(BuiltinFunction::Mul.apply(&inputs, &weights), 32.0);
        assert_eq!(BuiltinFunction::Div.apply(&inputs, &weights), 2.0);
    }

    #[test]
    fn test_division_by_zero_is_unguarded() {
        let out = BuiltinFunction::Div.apply(&[1.0, 0.0], &[0.0, 0.0]);
        assert!(out.is_infinite() && out > 0.0);

        let out = BuiltinFunction::Div.apply(&[0.0, 0.0], &[0.0, 0.0]);
        assert!(out.is_nan());
    }

    #[test]
    fn test_logical_functions() {
        let w = [0.0; 3];
        assert_eq!(BuiltinFunction::And.apply(&[1.0, 1.0, 1.0], &w), 1.0);
        assert_eq!(BuiltinFunction::And.apply(&[1.0, 0.0, 1.0], &w), 0.0);
        assert_eq!(BuiltinFunction::Nand.apply(&[1.0, 0.0, 1.0], &w), 1.0);
        assert_eq!(BuiltinFunction::Or.apply(&[0.0, 0.0, 1.0], &w), 1.0);
        assert_eq!(BuiltinFunction::Nor.apply(&[0.0, 0.0, 0.0], &w), 1.0);
        assert_eq!(BuiltinFunction::Xor.apply(&[0.0, 1.0, 0.0], &w), 1.0);
        assert_eq!(BuiltinFunction::Xor.apply(&[1.0, 1.0, 0.0], &w), 0.0);
        assert_eq!(BuiltinFunction::Xnor.apply(&[1.0, 1.0, 0.0], &w), 1.0);
        assert_eq!(BuiltinFunction::Not.apply(&[0.0, 1.0, 1.0], &w), 1.0);
        assert_eq!(BuiltinFunction::Not.apply(&[1.0, 0.0, 0.0], &w), 0.0);
    }

    #[test]
    fn test_logical_functions_on_non_binary_inputs() {
        // 0.5 is neither true nor false.
        let w = [0.0; 2];
        assert_eq!(BuiltinFunction::And.apply(&[0.5, 0.5], &w), 1.0);
        assert_eq!(BuiltinFunction::Or.apply(&[0.5, 0.5], &w), 0.0);
        assert_eq!(BuiltinFunction::Not.apply(&[0.5, 0.0], &w), 0.0);
    }

    #[test]
    fn test_from_names_skips_unknown() {
        let set = FunctionSet::from_names("add,bogus,mul");
        assert_eq!(set.len(), 2);
        assert_eq!(set.name(0), "add");
        assert_eq!(set.name(1), "mul");
        assert_eq!(set.lookup("mul"), Ok(1));
        assert_eq!(
            set.lookup("bogus"),
            Err(FunctionSetError::UnknownFunction("bogus".into()))
        );
    }

    #[test]
    fn test_capacity_limit() {
        let mut set = FunctionSet::new();
        for i in 0..MAX_FUNCTIONS {
            assert_eq!(set.register(&format!("f{i}"), |x, _| x[0]), Ok(i));
        }
        let err = set.add_builtin("add").unwrap_err();
        assert!(matches!(err, FunctionSetError::CapacityExceeded { capacity: 50, .. }));
        assert_eq!(set.len(), MAX_FUNCTIONS);
    }

    #[test]
    fn test_custom_function_uses_weights() {
        let mut set = FunctionSet::new();
        let slot = set
            .register("weighted_sum", |inputs, weights| {
                inputs.iter().zip(weights).map(|(x, w)| x * w).sum()
            })
            .unwrap();
        let f = set.get(slot).unwrap();
        assert_eq!(f.call(&[2.0, 3.0], &[0.5, -1.0]), -2.0);
    }

    #[test]
    fn test_display_and_clear() {
        let mut set = FunctionSet::from_names("add,sub");
        assert_eq!(set.to_string(), "Functions (2): add sub");
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "Functions (0):");
    }
}
