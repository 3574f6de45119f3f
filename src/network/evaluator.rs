//! Stack-based reduction of postfix expressions.
//!
//! Runs in O(n) time and holds at most one stack slot per leaf. The
//! [`Evaluator`] keeps its stack between calls so the synthesis search can
//! evaluate millions of candidates without allocating.

use crate::errors::{EvalError, MalformedReason};
use crate::math::ImpedanceDomain;

use super::algebra::combine_at;
use super::expression::{Expression, Token};

/// Reusable postfix evaluator.
#[derive(Debug, Clone, Default)]
pub struct Evaluator<Z> {
    stack: Vec<Z>,
}

impl<Z: ImpedanceDomain> Evaluator<Z> {
    /// Creates an evaluator with an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Creates an evaluator sized for expressions of up to `leaves` leaves.
    #[must_use]
    pub fn with_capacity(leaves: usize) -> Self {
        Self {
            stack: Vec::with_capacity(leaves),
        }
    }

    /// Reduces `expression` to a single impedance.
    pub fn evaluate(&mut self, expression: &Expression<Z>) -> Result<Z, EvalError> {
        self.evaluate_tokens(expression.tokens())
    }

    /// Reduces a raw postfix token slice, scanning front to back.
    ///
    /// Each leaf is pushed; each operator pops the right then the left operand
    /// and pushes the combination. Exactly one value must remain.
    pub fn evaluate_tokens(&mut self, tokens: &[Token<Z>]) -> Result<Z, EvalError> {
        if tokens.is_empty() {
            return Err(EvalError::malformed(0, MalformedReason::Empty));
        }
        self.stack.clear();
        self.stack.reserve(tokens.len().div_ceil(2));

        for (position, token) in tokens.iter().enumerate() {
            match *token {
                Token::Leaf(z) => {
                    if !z.is_finite() {
                        return Err(EvalError::malformed(position, MalformedReason::NonFiniteLeaf));
                    }
                    self.stack.push(z);
                }
                Token::Op(op) => {
                    let (Some(b), Some(a)) = (self.stack.pop(), self.stack.pop()) else {
                        return Err(EvalError::malformed(position, MalformedReason::MissingOperands));
                    };
                    self.stack.push(combine_at(op, a, b, position)?);
                }
            }
        }

        match self.stack.as_slice() {
            [result] => Ok(*result),
            rest => Err(EvalError::malformed(
                tokens.len(),
                MalformedReason::LeftoverOperands { count: rest.len() },
            )),
        }
    }
}

/// Evaluates `expression` with a freshly sized stack.
///
/// The numeric domain follows the leaves: a real expression yields a real
/// impedance and a complex one a complex impedance. Use
/// [`Expression::to_complex`] to evaluate a real network with complex
/// arithmetic.
pub fn evaluate<Z: ImpedanceDomain>(expression: &Expression<Z>) -> Result<Z, EvalError> {
    Evaluator::with_capacity(expression.len().div_ceil(2)).evaluate(expression)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{CScalar, Scalar};
    use crate::network::{Operator, Tree};

    /// xorshift64* so the randomized round trip is reproducible.
    struct Rng(u64);

    impl Rng {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 >> 12;
            self.0 ^= self.0 << 25;
            self.0 ^= self.0 >> 27;
            self.0.wrapping_mul(0x2545_f491_4f6c_dd1d)
        }

        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }

        fn unit(&mut self) -> Scalar {
            (self.next() >> 11) as Scalar / (1u64 << 53) as Scalar
        }
    }

    fn random_tree<Z, F>(rng: &mut Rng, leaves: usize, leaf: &mut F) -> Tree<Z>
    where
        F: FnMut(&mut Rng) -> Z,
    {
        if leaves == 1 {
            return Tree::leaf(leaf(rng));
        }
        let split = 1 + rng.below(leaves as u64 - 1) as usize;
        let op = Operator::ALL[rng.below(2) as usize];
        let left = random_tree(rng, split, leaf);
        let right = random_tree(rng, leaves - split, leaf);
        Tree::node(op, left, right)
    }

    #[test]
    fn evaluates_worked_example() {
        let expr = Expression::parallel(
            Expression::leaf(220.0e3),
            Expression::series(Expression::leaf(47.0e3), Expression::leaf(100.0e3)),
        );
        assert_relative_eq!(evaluate(&expr).unwrap(), 88_119.891_008_174_38, max_relative = 1.0e-12);
    }

    #[test]
    fn single_leaf_is_its_own_value() {
        assert_eq!(evaluate(&Expression::leaf(4.7e3)).unwrap(), 4.7e3);
    }

    #[test]
    fn two_leaves_without_operator_are_malformed() {
        let expr = Expression::from_tokens(vec![Token::Leaf(10.0), Token::Leaf(22.0)]);
        assert_eq!(
            evaluate(&expr),
            Err(EvalError::malformed(2, MalformedReason::LeftoverOperands { count: 2 }))
        );
    }

    #[test]
    fn operator_without_operands_is_malformed() {
        let expr = Expression::from_tokens(vec![
            Token::Leaf(10.0),
            Token::Op(Operator::Parallel),
            Token::Leaf(22.0),
        ]);
        assert_eq!(
            evaluate(&expr),
            Err(EvalError::malformed(1, MalformedReason::MissingOperands))
        );
    }

    #[test]
    fn empty_expression_is_malformed() {
        let expr: Expression<Scalar> = Expression::from_tokens(Vec::new());
        assert_eq!(evaluate(&expr), Err(EvalError::malformed(0, MalformedReason::Empty)));
    }

    #[test]
    fn degenerate_parallel_reports_operator_position() {
        let expr = Expression::parallel(Expression::leaf(100.0), Expression::leaf(-100.0));
        assert_eq!(evaluate(&expr), Err(EvalError::DegenerateNetwork { position: 2 }));
    }

    #[test]
    fn infinite_leaf_is_rejected() {
        let expr = Expression::series(Expression::leaf(1.0), Expression::leaf(Scalar::INFINITY));
        assert_eq!(
            evaluate(&expr),
            Err(EvalError::malformed(1, MalformedReason::NonFiniteLeaf))
        );
    }

    #[test]
    fn extreme_finite_leaves_stay_finite() {
        let huge = Expression::parallel(Expression::leaf(3.0e200), Expression::leaf(3.0e200));
        assert_relative_eq!(evaluate(&huge).unwrap(), 1.5e200, max_relative = 1.0e-12);
        let tiny = Expression::parallel(Expression::leaf(1.0e-200), Expression::leaf(1.0e-200));
        assert_relative_eq!(evaluate(&tiny).unwrap(), 5.0e-201, max_relative = 1.0e-12);
        assert_relative_eq!(evaluate(&huge.to_complex()).unwrap().re, 1.5e200, max_relative = 1.0e-12);
    }

    #[test]
    fn overflowing_series_is_an_error() {
        let expr = Expression::parallel(
            Expression::leaf(1.0),
            Expression::series(Expression::leaf(Scalar::MAX), Expression::leaf(Scalar::MAX)),
        );
        assert_eq!(evaluate(&expr), Err(EvalError::Overflow { position: 3 }));
    }

    #[test]
    fn real_expression_evaluates_identically_in_complex_domain() {
        let expr = Expression::parallel(
            Expression::leaf(680.0e3),
            Expression::leaf(100.0e3),
        );
        let real = evaluate(&expr).unwrap();
        let complex = evaluate(&expr.to_complex()).unwrap();
        assert_relative_eq!(complex.re, real, max_relative = 1.0e-12);
        assert_relative_eq!(complex.im, 0.0);
    }

    #[test]
    fn evaluator_reuse_does_not_leak_state() {
        let mut evaluator = Evaluator::new();
        let bad = Expression::from_tokens(vec![Token::Leaf(1.0), Token::Leaf(2.0)]);
        assert!(evaluator.evaluate(&bad).is_err());
        let good = Expression::series(Expression::leaf(1.0), Expression::leaf(2.0));
        assert_eq!(evaluator.evaluate(&good).unwrap(), 3.0);
    }

    #[test]
    fn random_trees_match_postfix_form_real() {
        let mut rng = Rng(0x9e37_79b9_7f4a_7c15);
        let mut evaluator = Evaluator::new();
        for _ in 0..500 {
            let leaves = 1 + rng.below(8) as usize;
            let tree = random_tree(&mut rng, leaves, &mut |r: &mut Rng| 1.0 + r.unit() * 1.0e6);
            let expr = tree.to_expression();
            assert_eq!(expr.leaf_count(), leaves);
            assert_eq!(evaluator.evaluate(&expr).unwrap(), tree.evaluate().unwrap());
            assert_eq!(expr.to_tree().unwrap(), tree);
        }
    }

    #[test]
    fn random_trees_match_postfix_form_complex() {
        let mut rng = Rng(0x0123_4567_89ab_cdef);
        let mut evaluator = Evaluator::new();
        for _ in 0..500 {
            let leaves = 1 + rng.below(6) as usize;
            let tree = random_tree(&mut rng, leaves, &mut |r: &mut Rng| {
                CScalar::new(1.0 + r.unit() * 1.0e3, r.unit() * 2.0e3 - 1.0e3)
            });
            let expr = tree.to_expression();
            assert_eq!(evaluator.evaluate(&expr), tree.evaluate());
        }
    }
}
