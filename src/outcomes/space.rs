//! Cartesian outcome spaces - ordered issue products.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::discrete::{outcome_at, DiscreteOutcomeSpace, OutcomeIter};
use super::{Cardinality, Issue, Outcome, OutcomeError};

/// Number of grid values a continuous issue gets when a discrete view is
/// required and the caller did not choose a level count.
pub const DEFAULT_DISCRETE_LEVELS: usize = 10;

static NEXT_SPACE_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn auto_name() -> String {
    format!("os.{}", NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed))
}

/// The capability shared by every outcome space built as a product of
/// independent issues: cardinality, validity and type checks, and sampling.
///
/// Predicates are universal quantifiers over the current issues and are
/// re-derived on every call.
pub trait CartesianSpace {
    /// The ordered issue sequence. Issue order is the canonical tuple order
    /// for every outcome this space validates or produces.
    fn issues(&self) -> &[Issue];

    /// The space name.
    fn name(&self) -> &str;

    /// Ordered issue names.
    fn issue_names(&self) -> Vec<String> {
        self.issues().iter().map(|i| i.name().to_string()).collect()
    }

    /// The number of outcomes: the product of per-issue cardinalities.
    fn cardinality(&self) -> Cardinality {
        Cardinality::product(self.issues().iter().map(Issue::cardinality))
    }

    /// Returns true if every issue is a range (integer or real interval).
    fn is_compact(&self) -> bool {
        self.issues()
            .iter()
            .all(|i| matches!(i, Issue::Contiguous(_) | Issue::Continuous(_)))
    }

    /// Returns true if every issue is continuous.
    fn is_all_continuous(&self) -> bool {
        self.issues().iter().all(Issue::is_continuous)
    }

    /// Returns true if every issue is discrete.
    fn is_discrete(&self) -> bool {
        self.issues().iter().all(Issue::is_discrete)
    }

    /// Returns true if every issue is numeric.
    fn is_numeric(&self) -> bool {
        self.issues().iter().all(Issue::is_numeric)
    }

    /// Returns true if every issue is integer-valued.
    fn is_integer(&self) -> bool {
        self.issues().iter().all(Issue::is_integer)
    }

    /// Returns true if every issue is real-valued.
    fn is_float(&self) -> bool {
        self.issues().iter().all(Issue::is_float)
    }

    /// The cardinality this space would have after discretizing every
    /// continuous issue to `levels` values.
    fn cardinality_if_discretized(&self, levels: usize) -> Cardinality {
        Cardinality::product(self.issues().iter().map(|i| {
            if i.is_continuous() {
                Cardinality::Finite(levels as u128)
            } else {
                i.cardinality()
            }
        }))
    }

    /// Returns true if `outcome` has one in-domain value per issue.
    fn is_valid(&self, outcome: &Outcome) -> bool {
        let issues = self.issues();
        outcome.len() == issues.len()
            && issues
                .iter()
                .zip(outcome.iter())
                .all(|(issue, value)| issue.contains(value))
    }

    /// Returns true if every value in `outcome` has the type its issue
    /// expects.
    fn are_types_ok(&self, outcome: &Outcome) -> bool {
        let issues = self.issues();
        outcome.len() == issues.len()
            && issues
                .iter()
                .zip(outcome.iter())
                .all(|(issue, value)| issue.type_matches(value))
    }

    /// Returns a copy of `outcome` with every value coerced to its issue's
    /// type, or fails with a type error.
    fn ensure_correct_types(&self, outcome: &Outcome) -> Result<Outcome, OutcomeError> {
        let issues = self.issues();
        if outcome.len() != issues.len() {
            return Err(OutcomeError::ArityMismatch {
                expected: issues.len(),
                actual: outcome.len(),
            });
        }
        issues
            .iter()
            .zip(outcome.iter())
            .map(|(issue, value)| issue.coerce(value))
            .collect()
    }

    /// Samples `n` outcomes by drawing each issue independently and zipping
    /// the results.
    ///
    /// Without replacement, a space with fewer than `n` outcomes fails when
    /// `fail_if_not_enough` is set and otherwise returns every outcome it
    /// has, in random order.
    fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        with_replacement: bool,
        fail_if_not_enough: bool,
    ) -> Result<Vec<Outcome>, OutcomeError> {
        let issues = self.issues();
        let draw = |rng: &mut R| -> Outcome {
            issues.iter().map(|i| i.sample_one(&mut *rng)).collect()
        };
        if with_replacement {
            return Ok((0..n).map(|_| draw(&mut *rng)).collect());
        }
        match self.cardinality() {
            Cardinality::Finite(card) if card <= n as u128 => {
                // Every outcome is needed; enumerate and shuffle.
                if card < n as u128 && fail_if_not_enough {
                    return Err(OutcomeError::InsufficientSamples {
                        requested: n,
                        available: card,
                    });
                }
                let mut all: Vec<Outcome> = OutcomeIter::over(issues).collect();
                use rand::seq::SliceRandom;
                all.shuffle(rng);
                all.truncate(n);
                Ok(all)
            }
            Cardinality::Finite(card) => {
                // Distinct outcomes correspond to distinct mixed-radix
                // indices, so sampling indices avoids rejection loops.
                if card <= usize::MAX as u128 {
                    let picked = rand::seq::index::sample(rng, card as usize, n);
                    Ok(picked.iter().map(|k| outcome_at(issues, k as u128)).collect())
                } else {
                    let mut seen = std::collections::HashSet::with_capacity(n);
                    let mut out = Vec::with_capacity(n);
                    while out.len() < n {
                        let k = rng.gen_range(0..card);
                        if seen.insert(k) {
                            out.push(outcome_at(issues, k));
                        }
                    }
                    Ok(out)
                }
            }
            Cardinality::Infinite => {
                let mut out: Vec<Outcome> = Vec::with_capacity(n);
                let mut attempts = 0usize;
                let max_attempts = n.saturating_mul(10).saturating_add(100);
                while out.len() < n && attempts < max_attempts {
                    attempts += 1;
                    let o = draw(&mut *rng);
                    if !out.contains(&o) {
                        out.push(o);
                    }
                }
                if out.len() < n && fail_if_not_enough {
                    return Err(OutcomeError::InsufficientSamples {
                        requested: n,
                        available: out.len() as u128,
                    });
                }
                Ok(out)
            }
        }
    }
}

/// The Cartesian product of an ordered issue list.
///
/// Immutable once built; every transform returns a new space. Spaces whose
/// issues are all discrete are usually held as [`DiscreteOutcomeSpace`],
/// which additionally supports exact enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartesianOutcomeSpace {
    name: String,
    issues: Vec<Issue>,
}

impl CartesianOutcomeSpace {
    /// Creates a space over `issues` with an auto-generated name.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            name: auto_name(),
            issues,
        }
    }

    /// Creates a named space over `issues`.
    pub fn with_name(issues: Vec<Issue>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            issues,
        }
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Issue>) {
        (self.name, self.issues)
    }

    /// Discretizes every continuous issue to `levels` grid values.
    ///
    /// Fails with a capacity error before doing any work when the resulting
    /// cardinality would exceed `max_cardinality`.
    pub fn to_discrete(
        &self,
        levels: usize,
        max_cardinality: Cardinality,
    ) -> Result<DiscreteOutcomeSpace, OutcomeError> {
        if let Cardinality::Finite(cap) = max_cardinality {
            if self.cardinality_if_discretized(levels).exceeds(cap) {
                return Err(OutcomeError::CapacityExceeded {
                    required: self
                        .cardinality_if_discretized(levels)
                        .as_finite()
                        .unwrap_or(u128::MAX),
                    max_cardinality: cap,
                });
            }
        }
        debug!(space = %self.name, levels, "discretizing outcome space");
        let issues = self
            .issues
            .iter()
            .map(|issue| {
                if issue.is_continuous() {
                    issue.to_discrete(levels, false, true, true)
                } else {
                    Ok(issue.clone())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DiscreteOutcomeSpace::with_name_unchecked(
            issues,
            self.name.clone(),
        ))
    }

    /// Collapses the space into a single synthetic issue, discretizing first
    /// as needed.
    ///
    /// An already-single-issue discrete space passes through unchanged, so
    /// callers can rely on the no-op. See
    /// [`DiscreteOutcomeSpace::to_single_issue`] for the value scheme.
    pub fn to_single_issue(
        self,
        numeric: bool,
        stringify: bool,
        levels: usize,
        max_cardinality: Cardinality,
    ) -> Result<DiscreteOutcomeSpace, OutcomeError> {
        if self.is_discrete() && self.issues.len() == 1 {
            let (name, issues) = self.into_parts();
            return Ok(DiscreteOutcomeSpace::with_name_unchecked(issues, name));
        }
        let discrete = self.to_discrete(levels, max_cardinality)?;
        Ok(discrete.to_single_issue(numeric, stringify))
    }
}

impl CartesianSpace for CartesianOutcomeSpace {
    fn issues(&self) -> &[Issue] {
        &self.issues
    }

    fn name(&self) -> &str {
        &self.name
    }
}
