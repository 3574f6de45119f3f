//! Series/parallel impedance networks: algebra, representations and evaluation.

/// Series and parallel combination rules.
pub mod algebra;
/// Postfix token sequences.
pub mod expression;
/// Binary and flattened tree forms.
pub mod tree;
/// Stack-based reduction of postfix expressions.
pub mod evaluator;

pub use algebra::{parallel, series, Operator};
pub use evaluator::{evaluate, Evaluator};
pub use expression::{Expression, Token};
pub use tree::{FlatNetwork, Tree};
