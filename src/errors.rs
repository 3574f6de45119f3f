//! Shared error types used across submodules.

use thiserror::Error;

use crate::math::Scalar;
use crate::synthesis::SynthesisError;

/// Raised by the parallel rule when the operands cancel (`a + b ≈ 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("parallel combination of impedances summing to zero")]
pub struct DegenerateNetwork;

/// Why an expression failed the postfix well-formedness rules.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The expression contains no tokens at all.
    Empty,
    /// An operator was reached with fewer than two values on the stack.
    MissingOperands,
    /// The scan finished with more than one value left on the stack.
    LeftoverOperands {
        /// Number of values still on the stack.
        count: usize,
    },
    /// A leaf holds NaN or an infinite component.
    NonFiniteLeaf,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("expression is empty"),
            Self::MissingOperands => f.write_str("operator has fewer than two operands"),
            Self::LeftoverOperands { count } => {
                write!(f, "{count} values left after the last operator")
            }
            Self::NonFiniteLeaf => f.write_str("leaf value is not finite"),
        }
    }
}

/// Failures while reducing an expression to a single impedance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The token sequence does not describe a binary series/parallel tree.
    #[error("malformed expression at token {position}: {reason}")]
    MalformedExpression {
        /// Index of the offending token (the length of the expression when
        /// the problem is only detectable after the scan).
        position: usize,
        /// What was wrong.
        reason: MalformedReason,
    },
    /// A parallel operator combined two impedances that cancel.
    #[error("degenerate network at token {position}: parallel operands sum to zero")]
    DegenerateNetwork {
        /// Index of the parallel operator token.
        position: usize,
    },
    /// Combining two finite operands left the representable range.
    #[error("overflow at token {position}: combined impedance is not finite")]
    Overflow {
        /// Index of the operator token.
        position: usize,
    },
}

impl EvalError {
    pub(crate) const fn malformed(position: usize, reason: MalformedReason) -> Self {
        Self::MalformedExpression { position, reason }
    }

    /// Token position associated with the error.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::MalformedExpression { position, .. }
            | Self::DegenerateNetwork { position }
            | Self::Overflow { position } => *position,
        }
    }
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Wraps expression evaluation errors.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// Wraps synthesis errors for resistive (real) networks.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError<Scalar>),
    /// Raised when a catalog cannot be built from the supplied parameters.
    #[error("catalog error: {0}")]
    Catalog(String),
}
