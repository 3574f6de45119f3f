//! Search for series/parallel networks of catalog values near a target.
//!
//! Leaf counts are searched in increasing order. For each count every tree
//! shape is turned into a postfix template whose slots are filled from the
//! alphabet; complete candidates go through the [`Evaluator`](crate::network::Evaluator)
//! and those inside the tolerance are kept. Results are deduplicated under
//! commutativity and associativity and ranked by leaf count, relative error
//! and finally alphabet order.

/// Search parameters and tolerance modes.
pub mod config;
mod search;
pub(crate) mod shapes;

pub use config::{SearchLimits, SynthesisConfig, Tolerance, MAX_LEAVES};

use std::collections::HashSet;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::catalog::Catalog;
use crate::errors::EvalError;
use crate::math::{ImpedanceDomain, Scalar};
use crate::network::{Expression, FlatNetwork, Tree};

use search::{Budget, Candidate, Pruning, Scratch, Search, WorkOutcome};
use shapes::Template;

/// Errors raised by the synthesizer.
#[derive(Debug, Error)]
pub enum SynthesisError<Z: ImpedanceDomain> {
    /// No candidate up to the configured size met the tolerance.
    #[error("no network found within tolerance{}", describe_miss(.closest, .truncated))]
    NoNetworkFound {
        /// Closest candidate that was evaluated, if any.
        closest: Option<Box<SynthesisResult<Z>>>,
        /// The search budget ran out before the space was exhausted.
        truncated: bool,
    },
    /// Parameters the search cannot work with.
    #[error("invalid synthesis configuration: {0}")]
    InvalidConfig(String),
    /// A shape template failed to evaluate as a postfix expression.
    #[error("candidate evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

fn describe_miss<Z: ImpedanceDomain>(
    closest: &Option<Box<SynthesisResult<Z>>>,
    truncated: &bool,
) -> String {
    let mut text = match closest {
        Some(best) => format!(
            " (closest: {} = {}, relative error {:.3e})",
            best.network(),
            best.impedance(),
            best.deviation().relative
        ),
        None => String::new(),
    };
    if *truncated {
        text.push_str(" before the search budget ran out");
    }
    text
}

impl<Z: ImpedanceDomain> SynthesisError<Z> {
    /// Closest candidate carried by [`NoNetworkFound`](Self::NoNetworkFound).
    #[must_use]
    pub fn closest(&self) -> Option<&SynthesisResult<Z>> {
        match self {
            Self::NoNetworkFound { closest, .. } => closest.as_deref(),
            Self::InvalidConfig(_) | Self::Evaluation(_) => None,
        }
    }
}

/// Error of a candidate against the target.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation<Z> {
    /// `value - target`.
    pub signed: Z,
    /// `|value - target|`.
    pub absolute: Scalar,
    /// `|value - target| / |target|`.
    pub relative: Scalar,
}

impl<Z: ImpedanceDomain> Deviation<Z> {
    /// Deviation of `value` from a non-zero `target`.
    #[must_use]
    pub fn new(value: Z, target: Z) -> Self {
        let signed = value - target;
        let absolute = signed.magnitude();
        Self {
            signed,
            absolute,
            relative: absolute / target.magnitude(),
        }
    }
}

/// One network that meets (or, inside an error, approaches) the target.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult<Z> {
    expression: Expression<Z>,
    tree: Tree<Z>,
    impedance: Z,
    deviation: Deviation<Z>,
    network: FlatNetwork<Z>,
    key: FlatNetwork<usize>,
}

impl<Z: ImpedanceDomain> SynthesisResult<Z> {
    fn from_candidate(candidate: &Candidate<Z>, template: &Template, alphabet: &[Z]) -> Self {
        let indices = &candidate.indices;
        let key = template
            .tree
            .map(&mut |&slot| indices[slot])
            .flatten()
            .canonical();
        let tree = template.tree.map(&mut |&slot| alphabet[indices[slot]]);
        Self {
            expression: tree.to_expression(),
            tree,
            impedance: candidate.value,
            deviation: candidate.deviation,
            network: key.map(&mut |&index| alphabet[index]),
            key,
        }
    }

    /// Postfix form of the network.
    #[must_use]
    pub const fn expression(&self) -> &Expression<Z> {
        &self.expression
    }

    /// Evaluated impedance.
    #[must_use]
    pub const fn impedance(&self) -> Z {
        self.impedance
    }

    /// Error against the requested target.
    #[must_use]
    pub const fn deviation(&self) -> &Deviation<Z> {
        &self.deviation
    }

    /// Number of components.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.key.size()
    }

    /// Canonical flattened form, used for display.
    #[must_use]
    pub const fn network(&self) -> &FlatNetwork<Z> {
        &self.network
    }

    /// Binary tree form of [`expression`](Self::expression).
    #[must_use]
    pub const fn tree(&self) -> &Tree<Z> {
        &self.tree
    }

    /// Canonical form in terms of alphabet indices.
    #[must_use]
    pub const fn canonical_indices(&self) -> &FlatNetwork<usize> {
        &self.key
    }
}

impl<Z: std::fmt::Display> std::fmt::Display for SynthesisResult<Z> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.network)
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Complete candidates that produced a value.
    pub evaluated: u64,
    /// Partial assignments cut by the bound test.
    pub pruned: u64,
    /// Candidates skipped because a parallel step cancelled.
    pub degenerate: u64,
    /// Candidates skipped because their impedance is not representable.
    pub overflowed: u64,
    /// Largest leaf count that was searched.
    pub levels_searched: usize,
    /// The time or candidate budget stopped the run early.
    pub truncated: bool,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Ranked results together with run statistics.
#[derive(Debug, Clone)]
pub struct SearchOutcome<Z> {
    /// Results, best first.
    pub results: Vec<SynthesisResult<Z>>,
    /// Run statistics.
    pub stats: SearchStats,
}

/// Network search over an alphabet of impedances.
///
/// The alphabet is usually a [`Catalog`]'s magnitudes (real) or its
/// [`impedances`](Catalog::impedances) for a reactive part (complex).
/// Bound pruning is used when the target and every value are positive real;
/// it is most effective on an ascending alphabet.
#[derive(Debug, Clone)]
pub struct Synthesizer<'a, Z> {
    alphabet: &'a [Z],
    config: SynthesisConfig<Z>,
}

impl<'a, Z: ImpedanceDomain> Synthesizer<'a, Z> {
    /// Binds an alphabet and a configuration.
    #[must_use]
    pub const fn new(alphabet: &'a [Z], config: SynthesisConfig<Z>) -> Self {
        Self { alphabet, config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SynthesisConfig<Z> {
        &self.config
    }

    /// Runs the search.
    ///
    /// Fails with [`SynthesisError::NoNetworkFound`] when nothing meets the
    /// tolerance, carrying the closest candidate evaluated.
    pub fn run(&self) -> Result<SearchOutcome<Z>, SynthesisError<Z>> {
        self.config.validate()?;
        if self.alphabet.is_empty() {
            return Err(SynthesisError::InvalidConfig("alphabet is empty".into()));
        }
        if let Some(bad) = self.alphabet.iter().find(|z| !z.is_finite()) {
            return Err(SynthesisError::InvalidConfig(format!(
                "alphabet value {bad} is not finite"
            )));
        }

        let started = Instant::now();
        let config = &self.config;
        let budget = Budget::new(config.limits, started);
        let pruning = Pruning::new(self.alphabet, config.target, config.tolerance);
        let search = Search {
            alphabet: self.alphabet,
            target: config.target,
            tolerance: config.tolerance,
            pruning: pruning.as_ref(),
            budget: &budget,
        };

        let mut stats = SearchStats::default();
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let mut closest: Option<SynthesisResult<Z>> = None;

        for leaves in 1..=config.max_leaves {
            let templates = shapes::templates(leaves);
            for (index, template) in templates.iter().enumerate() {
                trace!(leaves, template = index, layout = %template.expression, "enumerating shape");
            }
            let outcomes = self.fan_out(&search, &templates)?;

            let mut level = LevelTally::default();
            for outcome in outcomes {
                level.absorb(&outcome);
                for hit in &outcome.hits {
                    let result = SynthesisResult::from_candidate(hit, &templates[hit.template], self.alphabet);
                    if seen.insert(result.key.clone()) {
                        level.unique += 1;
                        results.push(result);
                    }
                }
                if let Some(near) = &outcome.closest {
                    let improves = closest
                        .as_ref()
                        .map_or(true, |best| near.deviation.relative < best.deviation.relative);
                    if improves {
                        closest = Some(SynthesisResult::from_candidate(
                            near,
                            &templates[near.template],
                            self.alphabet,
                        ));
                    }
                }
            }

            stats.evaluated += level.evaluated;
            stats.pruned += level.pruned;
            stats.degenerate += level.degenerate;
            stats.overflowed += level.overflowed;
            stats.levels_searched = leaves;
            debug!(
                leaves,
                shapes = templates.len(),
                evaluated = level.evaluated,
                pruned = level.pruned,
                degenerate = level.degenerate,
                overflowed = level.overflowed,
                hits = level.unique,
                "leaf level finished"
            );

            if budget.is_stopped() {
                stats.truncated = true;
                warn!(
                    leaves,
                    evaluated = stats.evaluated,
                    "synthesis budget exhausted, returning partial results"
                );
                break;
            }
            if !results.is_empty() && !config.exhaustive {
                break;
            }
        }
        stats.elapsed = started.elapsed();

        if results.is_empty() {
            return Err(SynthesisError::NoNetworkFound {
                closest: closest.map(Box::new),
                truncated: stats.truncated,
            });
        }

        results.sort_by(|a, b| {
            a.leaf_count()
                .cmp(&b.leaf_count())
                .then(a.deviation.relative.total_cmp(&b.deviation.relative))
                .then_with(|| a.key.cmp(&b.key))
        });
        if let Some(max) = config.max_results {
            results.truncate(max);
        }
        Ok(SearchOutcome { results, stats })
    }

    /// Explores every (template, first value) work item, in work order.
    fn fan_out(
        &self,
        search: &Search<'_, Z>,
        templates: &[Template],
    ) -> Result<Vec<WorkOutcome<Z>>, EvalError> {
        let width = self.alphabet.len();
        let work: Vec<(usize, usize)> = (0..templates.len())
            .flat_map(|t| (0..width).map(move |first| (t, first)))
            .collect();

        #[cfg(feature = "parallel")]
        if self.config.parallel {
            use rayon::prelude::*;
            return work
                .par_iter()
                .map_init(Scratch::new, |scratch, &(t, first)| {
                    search.explore(scratch, templates, t, first)
                })
                .collect();
        }

        let mut scratch = Scratch::new();
        work.iter()
            .map(|&(t, first)| search.explore(&mut scratch, templates, t, first))
            .collect()
    }
}

#[derive(Default)]
struct LevelTally {
    evaluated: u64,
    pruned: u64,
    degenerate: u64,
    overflowed: u64,
    unique: usize,
}

impl LevelTally {
    fn absorb<Z>(&mut self, outcome: &WorkOutcome<Z>) {
        self.evaluated += outcome.evaluated;
        self.pruned += outcome.pruned;
        self.degenerate += outcome.degenerate;
        self.overflowed += outcome.overflowed;
    }
}

/// Ranked resistor networks from `catalog` within a relative `tolerance` of
/// `target`, using at most `max_leaves` components.
///
/// Stops at the smallest component count that produces a match.
pub fn synthesize(
    target: Scalar,
    tolerance: Scalar,
    max_leaves: usize,
    catalog: &Catalog,
) -> Result<Vec<SynthesisResult<Scalar>>, SynthesisError<Scalar>> {
    let config = SynthesisConfig::new(target, Tolerance::Relative(tolerance), max_leaves);
    Synthesizer::new(catalog.magnitudes(), config)
        .run()
        .map(|outcome| outcome.results)
}
