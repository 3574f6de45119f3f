//! Tree forms of a network.
//!
//! [`Tree`] mirrors the postfix encoding node for node. [`FlatNetwork`] merges
//! chains of the same operator into one n-ary group, which is how networks are
//! displayed and how equivalent arrangements are recognized.

use std::cmp::Ordering;

use crate::errors::{EvalError, MalformedReason};
use crate::math::ImpedanceDomain;

use super::algebra::{combine_at, Operator};
use super::expression::{Expression, Token};

/// Binary series/parallel tree.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<Z> {
    /// Single component.
    Leaf(Z),
    /// Two sub-networks joined by an operator.
    Node {
        /// Composition rule.
        op: Operator,
        /// First operand.
        left: Box<Tree<Z>>,
        /// Second operand.
        right: Box<Tree<Z>>,
    },
}

impl<Z> Tree<Z> {
    /// Single component.
    #[must_use]
    pub fn leaf(value: Z) -> Self {
        Self::Leaf(value)
    }

    /// Joins `left` and `right` with `op`.
    #[must_use]
    pub fn node(op: Operator, left: Self, right: Self) -> Self {
        Self::Node {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left + right`.
    #[must_use]
    pub fn series(left: Self, right: Self) -> Self {
        Self::node(Operator::Series, left, right)
    }

    /// `left || right`.
    #[must_use]
    pub fn parallel(left: Self, right: Self) -> Self {
        Self::node(Operator::Parallel, left, right)
    }

    /// Number of components.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Node { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Longest root-to-leaf path, counting the root as depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Applies `f` to every leaf.
    #[must_use]
    pub fn map<W, F>(&self, f: &mut F) -> Tree<W>
    where
        F: FnMut(&Z) -> W,
    {
        match self {
            Self::Leaf(z) => Tree::Leaf(f(z)),
            Self::Node { op, left, right } => {
                let left = left.map(f);
                let right = right.map(f);
                Tree::node(*op, left, right)
            }
        }
    }

    /// Postfix encoding of this tree.
    #[must_use]
    pub fn into_expression(self) -> Expression<Z> {
        let mut tokens = Vec::with_capacity(2 * self.leaf_count() - 1);
        self.push_postfix(&mut tokens);
        Expression::from_tokens(tokens)
    }

    /// Postfix encoding of this tree, cloning the leaves.
    #[must_use]
    pub fn to_expression(&self) -> Expression<Z>
    where
        Z: Clone,
    {
        self.clone().into_expression()
    }

    fn push_postfix(self, tokens: &mut Vec<Token<Z>>) {
        match self {
            Self::Leaf(z) => tokens.push(Token::Leaf(z)),
            Self::Node { op, left, right } => {
                left.push_postfix(tokens);
                right.push_postfix(tokens);
                tokens.push(Token::Op(op));
            }
        }
    }

    /// Merges same-operator chains into n-ary groups, smaller children first.
    #[must_use]
    pub fn flatten(&self) -> FlatNetwork<Z>
    where
        Z: Clone,
    {
        match self {
            Self::Leaf(z) => FlatNetwork::Leaf(z.clone()),
            Self::Node { op, left, right } => {
                let mut children = Vec::new();
                for child in [left, right] {
                    match child.flatten() {
                        FlatNetwork::Group { op: inner, children: nested } if inner == *op => {
                            children.extend(nested);
                        }
                        other => children.push(other),
                    }
                }
                children.sort_by_key(FlatNetwork::size);
                FlatNetwork::Group { op: *op, children }
            }
        }
    }
}

impl<Z: ImpedanceDomain> Tree<Z> {
    /// Recursively combines the leaves.
    ///
    /// Error positions refer to the postfix encoding of the tree, so they
    /// match what [`Evaluator`](super::Evaluator) reports for the same network.
    pub fn evaluate(&self) -> Result<Z, EvalError> {
        let mut position = 0;
        self.evaluate_at(&mut position)
    }

    fn evaluate_at(&self, position: &mut usize) -> Result<Z, EvalError> {
        match self {
            Self::Leaf(z) => {
                if !z.is_finite() {
                    return Err(EvalError::malformed(*position, MalformedReason::NonFiniteLeaf));
                }
                *position += 1;
                Ok(*z)
            }
            Self::Node { op, left, right } => {
                let a = left.evaluate_at(position)?;
                let b = right.evaluate_at(position)?;
                let at = *position;
                *position += 1;
                combine_at(*op, a, b, at)
            }
        }
    }
}

/// N-ary network where no group has a child with the same operator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlatNetwork<T> {
    /// Single component.
    Leaf(T),
    /// Two or more sub-networks joined by the same operator.
    Group {
        /// Composition rule shared by all children.
        op: Operator,
        /// Sub-networks, smallest first.
        children: Vec<FlatNetwork<T>>,
    },
}

impl<T> FlatNetwork<T> {
    /// Number of components.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::size).sum(),
        }
    }

    /// Applies `f` to every leaf.
    #[must_use]
    pub fn map<W, F>(&self, f: &mut F) -> FlatNetwork<W>
    where
        F: FnMut(&T) -> W,
    {
        match self {
            Self::Leaf(t) => FlatNetwork::Leaf(f(t)),
            Self::Group { op, children } => FlatNetwork::Group {
                op: *op,
                children: children.iter().map(|c| c.map(f)).collect(),
            },
        }
    }

    /// Orders every group's children by size, then by value, so that
    /// rearrangements of the same network produce identical results.
    #[must_use]
    pub fn canonical(mut self) -> Self
    where
        T: Ord,
    {
        self.canonicalize();
        self
    }

    fn canonicalize(&mut self)
    where
        T: Ord,
    {
        if let Self::Group { children, .. } = self {
            for child in children.iter_mut() {
                child.canonicalize();
            }
            children.sort_by(|a, b| match a.size().cmp(&b.size()) {
                Ordering::Equal => a.cmp(b),
                unequal => unequal,
            });
        }
    }
}

impl<Z: ImpedanceDomain> FlatNetwork<Z> {
    /// Folds every group left to right with its operator.
    ///
    /// Error positions index the postfix encoding of that fold, where a group
    /// `(c0 op c1 op c2)` is written `c0 c1 op c2 op`. For a flattened
    /// [`Tree`] this is the tree's own postfix form up to reassociation.
    pub fn evaluate(&self) -> Result<Z, EvalError> {
        let mut position = 0;
        self.evaluate_at(&mut position)
    }

    fn evaluate_at(&self, position: &mut usize) -> Result<Z, EvalError> {
        match self {
            Self::Leaf(z) => {
                if !z.is_finite() {
                    return Err(EvalError::malformed(*position, MalformedReason::NonFiniteLeaf));
                }
                *position += 1;
                Ok(*z)
            }
            Self::Group { op, children } => {
                let (first, rest) = children
                    .split_first()
                    .ok_or(EvalError::malformed(*position, MalformedReason::Empty))?;
                let mut acc = first.evaluate_at(position)?;
                for child in rest {
                    let value = child.evaluate_at(position)?;
                    acc = combine_at(*op, acc, value, *position)?;
                    *position += 1;
                }
                Ok(acc)
            }
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for FlatNetwork<T> {
    /// Infix form, e.g. `(220000 || (47000 + 100000))`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf(t) => write!(f, "{t}"),
            Self::Group { op, children } => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {op} ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl<Z: Clone + std::fmt::Display> std::fmt::Display for Tree<Z> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.flatten())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Scalar;

    fn worked_example() -> Tree<Scalar> {
        Tree::parallel(
            Tree::leaf(220.0e3),
            Tree::series(Tree::leaf(47.0e3), Tree::leaf(100.0e3)),
        )
    }

    #[test]
    fn worked_example_evaluates() {
        let tree = worked_example();
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.depth(), 3);
        assert_relative_eq!(tree.evaluate().unwrap(), 88_119.891_008_174_38, max_relative = 1.0e-12);
    }

    #[test]
    fn display_puts_smaller_children_first() {
        let tree = Tree::parallel(
            Tree::series(Tree::leaf(47.0e3), Tree::leaf(100.0e3)),
            Tree::leaf(220.0e3),
        );
        assert_eq!(tree.to_string(), "(220000 || (47000 + 100000))");
    }

    #[test]
    fn flatten_merges_same_operator_chains() {
        let tree = Tree::series(
            Tree::leaf(1.0),
            Tree::series(Tree::leaf(2.0), Tree::parallel(Tree::leaf(3.0), Tree::leaf(4.0))),
        );
        let flat = tree.flatten();
        assert_eq!(flat.size(), 4);
        assert_eq!(flat.to_string(), "(1 + 2 + (3 || 4))");
        assert_relative_eq!(flat.evaluate().unwrap(), tree.evaluate().unwrap());
    }

    #[test]
    fn canonical_form_ignores_arrangement() {
        let a: Tree<u32> = Tree::series(Tree::leaf(3), Tree::series(Tree::leaf(1), Tree::leaf(2)));
        let b: Tree<u32> = Tree::series(Tree::series(Tree::leaf(2), Tree::leaf(3)), Tree::leaf(1));
        assert_ne!(a.flatten(), b.flatten());
        assert_eq!(a.flatten().canonical(), b.flatten().canonical());
    }

    #[test]
    fn degenerate_position_matches_postfix_index() {
        let tree = Tree::series(Tree::leaf(1.0), Tree::parallel(Tree::leaf(5.0), Tree::leaf(-5.0)));
        assert_eq!(tree.evaluate(), Err(EvalError::DegenerateNetwork { position: 3 }));
    }

    #[test]
    fn flat_error_positions_follow_the_fold() {
        let tree = Tree::series(Tree::leaf(1.0), Tree::parallel(Tree::leaf(5.0), Tree::leaf(-5.0)));
        assert_eq!(
            tree.flatten().evaluate(),
            Err(EvalError::DegenerateNetwork { position: 3 })
        );

        // 1 2 + 5 -5 || +
        let flat = FlatNetwork::Group {
            op: Operator::Series,
            children: vec![
                FlatNetwork::Leaf(1.0),
                FlatNetwork::Leaf(2.0),
                FlatNetwork::Group {
                    op: Operator::Parallel,
                    children: vec![FlatNetwork::Leaf(5.0), FlatNetwork::Leaf(-5.0)],
                },
            ],
        };
        assert_eq!(flat.evaluate(), Err(EvalError::DegenerateNetwork { position: 5 }));

        let empty: FlatNetwork<Scalar> = FlatNetwork::Group {
            op: Operator::Parallel,
            children: Vec::new(),
        };
        assert_eq!(empty.evaluate(), Err(EvalError::malformed(0, MalformedReason::Empty)));
    }

    #[test]
    fn overflowing_combination_is_reported() {
        let tree = Tree::series(Tree::leaf(Scalar::MAX), Tree::leaf(Scalar::MAX));
        assert_eq!(tree.evaluate(), Err(EvalError::Overflow { position: 2 }));
        assert_eq!(tree.flatten().evaluate(), Err(EvalError::Overflow { position: 2 }));
    }

    #[test]
    fn non_finite_leaf_is_rejected() {
        let tree = Tree::series(Tree::leaf(1.0), Tree::leaf(Scalar::NAN));
        assert_eq!(
            tree.evaluate(),
            Err(EvalError::malformed(1, MalformedReason::NonFiniteLeaf))
        );
    }
}
