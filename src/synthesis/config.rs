use std::time::Duration;

use crate::math::{ImpedanceDomain, Scalar};

use super::SynthesisError;

/// Largest network the synthesizer will enumerate.
pub const MAX_LEAVES: usize = 8;

/// Acceptance criterion for a candidate network.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// `|value - target| / |target| <= bound`.
    Relative(Scalar),
    /// `|value - target| <= bound` (same unit as the target).
    Absolute(Scalar),
}

impl Tolerance {
    /// The numeric bound.
    #[must_use]
    pub const fn bound(self) -> Scalar {
        match self {
            Self::Relative(bound) | Self::Absolute(bound) => bound,
        }
    }

    /// Whether a candidate with the given deviations is acceptable.
    #[must_use]
    pub fn accepts(self, absolute: Scalar, relative: Scalar) -> bool {
        match self {
            Self::Relative(bound) => relative <= bound,
            Self::Absolute(bound) => absolute <= bound,
        }
    }

    /// Interval of acceptable values around a positive real `target`.
    #[must_use]
    pub fn band(self, target: Scalar) -> (Scalar, Scalar) {
        match self {
            Self::Relative(bound) => (target * (1.0 - bound), target * (1.0 + bound)),
            Self::Absolute(bound) => (target - bound, target + bound),
        }
    }
}

impl Default for Tolerance {
    /// 1 % relative.
    fn default() -> Self {
        Self::Relative(0.01)
    }
}

/// Caller-supplied limits that let a long search stop between candidates.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchLimits {
    /// Wall-clock budget measured from the start of the run.
    pub time_budget: Option<Duration>,
    /// Maximum number of complete candidates to evaluate.
    pub max_candidates: Option<u64>,
}

/// Parameters of one synthesis run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig<Z> {
    /// Impedance to approximate.
    pub target: Z,
    /// Acceptance criterion.
    pub tolerance: Tolerance,
    /// Maximum number of components in a network.
    pub max_leaves: usize,
    /// Keep searching larger networks after a leaf count produced matches.
    pub exhaustive: bool,
    /// Truncate the ranked list to this many entries.
    pub max_results: Option<usize>,
    /// Time and candidate budget.
    pub limits: SearchLimits,
    /// Distribute work items over the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl<Z: ImpedanceDomain> SynthesisConfig<Z> {
    /// Configuration with default options.
    #[must_use]
    pub fn new(target: Z, tolerance: Tolerance, max_leaves: usize) -> Self {
        Self {
            target,
            tolerance,
            max_leaves,
            exhaustive: false,
            max_results: None,
            limits: SearchLimits::default(),
            parallel: true,
        }
    }

    /// Sets [`exhaustive`](Self::exhaustive).
    #[must_use]
    pub fn with_exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    /// Sets [`max_results`](Self::max_results).
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Limits the run to `budget` of wall-clock time.
    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.limits.time_budget = Some(budget);
        self
    }

    /// Limits the run to `count` evaluated candidates.
    #[must_use]
    pub fn with_max_candidates(mut self, count: u64) -> Self {
        self.limits.max_candidates = Some(count);
        self
    }

    /// Sets [`parallel`](Self::parallel).
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rejects configurations the search cannot honour.
    pub fn validate(&self) -> Result<(), SynthesisError<Z>> {
        if !self.target.is_finite() || self.target.magnitude() == 0.0 {
            return Err(SynthesisError::InvalidConfig(format!(
                "target impedance must be finite and non-zero, got {}",
                self.target
            )));
        }
        let bound = self.tolerance.bound();
        if !bound.is_finite() || bound < 0.0 {
            return Err(SynthesisError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {bound}"
            )));
        }
        if !(1..=MAX_LEAVES).contains(&self.max_leaves) {
            return Err(SynthesisError::InvalidConfig(format!(
                "max_leaves must be between 1 and {MAX_LEAVES}, got {}",
                self.max_leaves
            )));
        }
        if self.max_results == Some(0) {
            return Err(SynthesisError::InvalidConfig(
                "max_results must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
