//! Postfix token sequences describing series/parallel networks.
//!
//! Tokens are stored in true postfix order: both operands precede their
//! operator (`47000 100000 +`). Every consumer scans front to back.

use crate::errors::{EvalError, MalformedReason};
use crate::math::{CScalar, ImpedanceDomain};

use super::algebra::Operator;
use super::tree::Tree;

/// Single element of a postfix expression.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<Z> {
    /// Component impedance.
    Leaf(Z),
    /// Composition of the two preceding sub-networks.
    Op(Operator),
}

impl<Z> Token<Z> {
    /// True for [`Token::Leaf`].
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Network encoded as a postfix token sequence.
///
/// A well-formed expression of length `n` holds `(n + 1) / 2` leaves and
/// `(n - 1) / 2` operators. Construction through [`Expression::from_tokens`]
/// does not check this, so structural problems surface when the expression is
/// evaluated or explicitly [validated](Expression::validate).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Expression<Z> {
    tokens: Vec<Token<Z>>,
}

impl<Z> Expression<Z> {
    /// Wraps a token sequence without checking it.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token<Z>>) -> Self {
        Self { tokens }
    }

    /// Single-component network.
    #[must_use]
    pub fn leaf(value: Z) -> Self {
        Self {
            tokens: vec![Token::Leaf(value)],
        }
    }

    /// Joins two networks with `op`.
    #[must_use]
    pub fn combine(op: Operator, lhs: Self, rhs: Self) -> Self {
        let mut tokens = lhs.tokens;
        tokens.reserve(rhs.tokens.len() + 1);
        tokens.extend(rhs.tokens);
        tokens.push(Token::Op(op));
        Self { tokens }
    }

    /// `lhs + rhs`.
    #[must_use]
    pub fn series(lhs: Self, rhs: Self) -> Self {
        Self::combine(Operator::Series, lhs, rhs)
    }

    /// `lhs || rhs`.
    #[must_use]
    pub fn parallel(lhs: Self, rhs: Self) -> Self {
        Self::combine(Operator::Parallel, lhs, rhs)
    }

    /// Tokens in postfix order.
    #[must_use]
    pub fn tokens(&self) -> &[Token<Z>] {
        &self.tokens
    }

    /// Consumes the expression, returning its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token<Z>> {
        self.tokens
    }

    /// Total number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the expression holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of leaf tokens.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_leaf()).count()
    }

    /// Number of operator tokens.
    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.tokens.len() - self.leaf_count()
    }

    /// Leaf values in encounter order.
    pub fn leaves(&self) -> impl Iterator<Item = &Z> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Leaf(z) => Some(z),
            Token::Op(_) => None,
        })
    }

    /// Checks the stack-balance rules without doing any arithmetic.
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.tokens.is_empty() {
            return Err(EvalError::malformed(0, MalformedReason::Empty));
        }
        let mut depth = 0usize;
        for (position, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Leaf(_) => depth += 1,
                Token::Op(_) if depth < 2 => {
                    return Err(EvalError::malformed(position, MalformedReason::MissingOperands));
                }
                Token::Op(_) => depth -= 1,
            }
        }
        if depth == 1 {
            Ok(())
        } else {
            Err(EvalError::malformed(
                self.tokens.len(),
                MalformedReason::LeftoverOperands { count: depth },
            ))
        }
    }

    /// Applies `f` to every leaf, keeping the structure.
    #[must_use]
    pub fn map_leaves<W, F>(&self, mut f: F) -> Expression<W>
    where
        Z: Copy,
        F: FnMut(Z) -> W,
    {
        let tokens = self
            .tokens
            .iter()
            .map(|t| match *t {
                Token::Leaf(z) => Token::Leaf(f(z)),
                Token::Op(op) => Token::Op(op),
            })
            .collect();
        Expression { tokens }
    }

    /// Rebuilds the binary tree this sequence encodes.
    pub fn to_tree(&self) -> Result<Tree<Z>, EvalError>
    where
        Z: Clone,
    {
        let mut stack: Vec<Tree<Z>> = Vec::with_capacity(self.tokens.len().div_ceil(2));
        for (position, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Leaf(z) => stack.push(Tree::Leaf(z.clone())),
                Token::Op(op) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(EvalError::malformed(position, MalformedReason::MissingOperands));
                    };
                    stack.push(Tree::node(*op, left, right));
                }
            }
        }
        match (stack.pop(), stack.len()) {
            (Some(tree), 0) => Ok(tree),
            (None, _) => Err(EvalError::malformed(0, MalformedReason::Empty)),
            (Some(_), rest) => Err(EvalError::malformed(
                self.tokens.len(),
                MalformedReason::LeftoverOperands { count: rest + 1 },
            )),
        }
    }
}

impl<Z: ImpedanceDomain> Expression<Z> {
    /// Same network evaluated with complex arithmetic.
    #[must_use]
    pub fn to_complex(&self) -> Expression<CScalar> {
        self.map_leaves(ImpedanceDomain::to_complex)
    }
}

impl<Z> From<Tree<Z>> for Expression<Z> {
    fn from(tree: Tree<Z>) -> Self {
        tree.into_expression()
    }
}

impl<Z: std::fmt::Display> std::fmt::Display for Expression<Z> {
    /// Space-separated postfix form, e.g. `47000 100000 +`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                Token::Leaf(z) => write!(f, "{z}")?,
                Token::Op(op) => write!(f, "{op}")?,
            }
        }
        Ok(())
    }
}
