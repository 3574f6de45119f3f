//! Convenience re-exports for evaluating and synthesizing impedance networks.

pub use crate::catalog::{angular_frequency, Catalog, CatalogEntry, ComponentKind, ESeries};
pub use crate::errors::{DegenerateNetwork, EvalError, MalformedReason, NetworkError};
pub use crate::math::{relative_deviation, CScalar, ImpedanceDomain, Scalar};
pub use crate::network::{
    evaluate, parallel, series, Evaluator, Expression, FlatNetwork, Operator, Token, Tree,
};
pub use crate::synthesis::{
    synthesize, Deviation, SearchLimits, SearchOutcome, SearchStats, SynthesisConfig,
    SynthesisError, SynthesisResult, Synthesizer, Tolerance,
};
