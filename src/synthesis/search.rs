//! Depth-first leaf assignment over one template.
//!
//! A work item is a template plus the alphabet index of its first slot.
//! Remaining slots are filled in ascending alphabet order; every complete
//! assignment is evaluated with the postfix [`Evaluator`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use crate::errors::EvalError;
use crate::math::{ImpedanceDomain, Scalar};
use crate::network::{Evaluator, Token};

use super::config::{SearchLimits, Tolerance};
use super::shapes::Template;
use super::Deviation;

/// How often (in generation steps) a worker consults the clock.
const CLOCK_INTERVAL: u32 = 64;
/// Relative slack on the pruning band so rounding never cuts a valid hit.
const BAND_SLACK: Scalar = 1.0e-9;

/// Shared stop condition for one run.
#[derive(Debug)]
pub(crate) struct Budget {
    deadline: Option<Instant>,
    max_candidates: Option<u64>,
    evaluated: AtomicU64,
    stopped: AtomicBool,
}

impl Budget {
    /// A time budget too large to represent as an instant means no deadline.
    pub fn new(limits: SearchLimits, started: Instant) -> Self {
        Self {
            deadline: limits
                .time_budget
                .and_then(|budget| started.checked_add(budget)),
            max_candidates: limits.max_candidates,
            evaluated: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    fn check_clock(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.stopped.store(true, Ordering::Relaxed);
            }
        }
        self.is_stopped()
    }

    /// Reserves one candidate evaluation; false once the count is used up.
    fn admit_candidate(&self) -> bool {
        match self.max_candidates {
            Some(max) if self.evaluated.fetch_add(1, Ordering::Relaxed) >= max => {
                self.stopped.store(true, Ordering::Relaxed);
                false
            }
            _ => true,
        }
    }
}

/// Positive-real bounds used to cut branches that cannot reach the target.
#[derive(Debug, Clone)]
pub(crate) struct Pruning {
    values: Vec<Scalar>,
    min: Scalar,
    max: Scalar,
    band: (Scalar, Scalar),
    ascending: bool,
}

impl Pruning {
    /// Available only when the target and every alphabet value are positive
    /// real: series and parallel are then monotone in each operand.
    pub fn new<Z: ImpedanceDomain>(alphabet: &[Z], target: Z, tolerance: Tolerance) -> Option<Self> {
        let target = target.as_positive_real()?;
        let values = alphabet
            .iter()
            .map(|z| z.as_positive_real())
            .collect::<Option<Vec<Scalar>>>()?;
        let min = values.iter().copied().fold(Scalar::INFINITY, Scalar::min);
        let max = values.iter().copied().fold(0.0, Scalar::max);
        let (lo, hi) = tolerance.band(target);
        Some(Self {
            ascending: values.windows(2).all(|w| w[0] <= w[1]),
            values,
            min,
            max,
            band: (lo * (1.0 - BAND_SLACK), hi * (1.0 + BAND_SLACK)),
        })
    }
}

enum Verdict {
    Feasible,
    /// Even the smallest completion is too large.
    Overshoot,
    /// Even the largest completion is too small.
    Undershoot,
}

/// Complete assignment that was evaluated.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<Z> {
    pub template: usize,
    pub indices: Vec<usize>,
    pub value: Z,
    pub deviation: Deviation<Z>,
}

/// Counters and findings of one work item.
#[derive(Debug)]
pub(crate) struct WorkOutcome<Z> {
    pub hits: Vec<Candidate<Z>>,
    pub closest: Option<Candidate<Z>>,
    pub evaluated: u64,
    pub pruned: u64,
    pub degenerate: u64,
    pub overflowed: u64,
}

impl<Z> Default for WorkOutcome<Z> {
    fn default() -> Self {
        Self {
            hits: Vec::new(),
            closest: None,
            evaluated: 0,
            pruned: 0,
            degenerate: 0,
            overflowed: 0,
        }
    }
}

/// Read-only state shared by all workers of a run.
pub(crate) struct Search<'a, Z> {
    pub alphabet: &'a [Z],
    pub target: Z,
    pub tolerance: Tolerance,
    pub pruning: Option<&'a Pruning>,
    pub budget: &'a Budget,
}

/// Per-worker buffers, reused across work items.
pub(crate) struct Scratch<Z> {
    evaluator: Evaluator<Z>,
    bound_evaluator: Evaluator<Scalar>,
    tokens: Vec<Token<Z>>,
    lower: Vec<Token<Scalar>>,
    upper: Vec<Token<Scalar>>,
    assignment: Vec<usize>,
    ticks: u32,
}

impl<Z: ImpedanceDomain> Scratch<Z> {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            bound_evaluator: Evaluator::new(),
            tokens: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
            assignment: Vec::new(),
            ticks: 0,
        }
    }

    fn load(&mut self, template: &Template, pruning: Option<&Pruning>) {
        let tokens = template.expression.tokens();
        fill_skeleton(tokens, Z::zero(), &mut self.tokens);
        self.lower.clear();
        self.upper.clear();
        if let Some(p) = pruning {
            fill_skeleton(tokens, p.min, &mut self.lower);
            fill_skeleton(tokens, p.max, &mut self.upper);
        }
        self.assignment.clear();
        self.assignment.resize(template.slots(), 0);
    }
}

/// Copies a slot-numbered template into `out` with every leaf set to `leaf`.
fn fill_skeleton<W: Copy>(template: &[Token<usize>], leaf: W, out: &mut Vec<Token<W>>) {
    out.clear();
    out.extend(template.iter().map(|token| match *token {
        Token::Leaf(_) => Token::Leaf(leaf),
        Token::Op(op) => Token::Op(op),
    }));
}

impl<Z: ImpedanceDomain> Search<'_, Z> {
    /// Explores every assignment of `template` whose first slot is `first`.
    ///
    /// Fails only if a template does not encode a well-formed expression.
    pub fn explore(
        &self,
        scratch: &mut Scratch<Z>,
        templates: &[Template],
        template: usize,
        first: usize,
    ) -> Result<WorkOutcome<Z>, EvalError> {
        let mut outcome = WorkOutcome::default();
        if self.budget.check_clock() {
            return Ok(outcome);
        }
        let tpl = &templates[template];
        scratch.load(tpl, self.pruning);
        self.descend(scratch, tpl, template, 0, first, first + 1, &mut outcome)?;
        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    fn descend(
        &self,
        scratch: &mut Scratch<Z>,
        tpl: &Template,
        template: usize,
        slot: usize,
        start: usize,
        end: usize,
        outcome: &mut WorkOutcome<Z>,
    ) -> Result<(), EvalError> {
        let position = tpl.slot_positions[slot];
        let last = slot + 1 == tpl.slots();
        let start = tpl.min_from[slot].map_or(start, |s| start.max(scratch.assignment[s]));

        for index in start..end {
            scratch.ticks = scratch.ticks.wrapping_add(1);
            if scratch.ticks % CLOCK_INTERVAL == 0 {
                if self.budget.check_clock() {
                    break;
                }
            } else if self.budget.is_stopped() {
                break;
            }

            scratch.assignment[slot] = index;
            scratch.tokens[position] = Token::Leaf(self.alphabet[index]);

            if last {
                if !self.budget.admit_candidate() {
                    break;
                }
                self.record(scratch, template, outcome)?;
                continue;
            }

            if let Some(pruning) = self.pruning {
                let value = pruning.values[index];
                scratch.lower[position] = Token::Leaf(value);
                scratch.upper[position] = Token::Leaf(value);
                match self.verdict(scratch, pruning) {
                    Verdict::Feasible => {}
                    Verdict::Overshoot => {
                        outcome.pruned += 1;
                        if pruning.ascending {
                            break;
                        }
                        continue;
                    }
                    Verdict::Undershoot => {
                        outcome.pruned += 1;
                        continue;
                    }
                }
            }

            self.descend(
                scratch,
                tpl,
                template,
                slot + 1,
                0,
                self.alphabet.len(),
                outcome,
            )?;
        }

        if let Some(pruning) = self.pruning {
            scratch.lower[position] = Token::Leaf(pruning.min);
            scratch.upper[position] = Token::Leaf(pruning.max);
        }
        Ok(())
    }

    fn verdict(&self, scratch: &mut Scratch<Z>, pruning: &Pruning) -> Verdict {
        let (lo, hi) = pruning.band;
        if let Ok(smallest) = scratch.bound_evaluator.evaluate_tokens(&scratch.lower) {
            if smallest > hi {
                return Verdict::Overshoot;
            }
        }
        if let Ok(largest) = scratch.bound_evaluator.evaluate_tokens(&scratch.upper) {
            if largest < lo {
                return Verdict::Undershoot;
            }
        }
        Verdict::Feasible
    }

    fn record(
        &self,
        scratch: &mut Scratch<Z>,
        template: usize,
        outcome: &mut WorkOutcome<Z>,
    ) -> Result<(), EvalError> {
        let value = match scratch.evaluator.evaluate_tokens(&scratch.tokens) {
            Ok(value) => value,
            Err(EvalError::DegenerateNetwork { .. }) => {
                outcome.degenerate += 1;
                return Ok(());
            }
            Err(EvalError::Overflow { .. }) => {
                outcome.overflowed += 1;
                return Ok(());
            }
            Err(err @ EvalError::MalformedExpression { .. }) => return Err(err),
        };
        outcome.evaluated += 1;

        let deviation = Deviation::new(value, self.target);
        let accepted = self.tolerance.accepts(deviation.absolute, deviation.relative);
        let closer = outcome
            .closest
            .as_ref()
            .map_or(true, |best| deviation.relative < best.deviation.relative);
        if !(accepted || closer) {
            return Ok(());
        }

        let candidate = Candidate {
            template,
            indices: scratch.assignment.clone(),
            value,
            deviation,
        };
        if accepted {
            outcome.hits.push(candidate.clone());
        }
        if closer {
            outcome.closest = Some(candidate);
        }
        Ok(())
    }
}
