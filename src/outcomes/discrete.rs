//! Finite outcome spaces with exact enumeration.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::space::{auto_name, CartesianSpace, DEFAULT_DISCRETE_LEVELS};
use super::{Cardinality, Issue, Outcome, OutcomeError, Value};

/// The capability of a finite space: deterministic full enumeration and an
/// exact outcome count.
pub trait FiniteSpace: CartesianSpace {
    /// A fresh traversal of the full Cartesian product in fixed odometer
    /// order: the first issue varies slowest. Every call restarts from the
    /// beginning; there is no shared cursor.
    fn enumerate(&self) -> OutcomeIter<'_>;

    /// The exact outcome count.
    fn exact_cardinality(&self) -> u128 {
        self.cardinality().as_finite().unwrap_or(u128::MAX)
    }
}

/// Decodes the outcome at `index` of the mixed-radix product over `issues`,
/// first issue slowest-varying.
pub(crate) fn outcome_at(issues: &[Issue], mut index: u128) -> Outcome {
    let mut out: Vec<Value> = Vec::with_capacity(issues.len());
    for issue in issues.iter().rev() {
        let radix = issue.cardinality().as_finite().unwrap_or(1).max(1);
        let digit = index % radix;
        index /= radix;
        if let Some(v) = issue.value_at(digit) {
            out.push(v);
        }
    }
    out.reverse();
    out
}

/// Lazy odometer over the Cartesian product of discrete issues.
#[derive(Debug)]
pub struct OutcomeIter<'a> {
    issues: &'a [Issue],
    radices: Vec<u128>,
    counters: Vec<u128>,
    exhausted: bool,
}

impl<'a> OutcomeIter<'a> {
    pub(crate) fn over(issues: &'a [Issue]) -> Self {
        let radices: Vec<u128> = issues
            .iter()
            .map(|i| i.cardinality().as_finite().unwrap_or(0))
            .collect();
        // A continuous issue has no finite radix; the traversal is empty.
        let exhausted = radices.iter().any(|&r| r == 0);
        Self {
            counters: vec![0; issues.len()],
            issues,
            radices,
            exhausted,
        }
    }
}

impl Iterator for OutcomeIter<'_> {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        if self.exhausted {
            return None;
        }
        let outcome: Outcome = self
            .issues
            .iter()
            .zip(self.counters.iter())
            .filter_map(|(issue, &k)| issue.value_at(k))
            .collect();
        // Advance the odometer: the last issue is the fastest-varying digit.
        let mut pos = self.counters.len();
        loop {
            if pos == 0 {
                self.exhausted = true;
                break;
            }
            pos -= 1;
            self.counters[pos] += 1;
            if self.counters[pos] < self.radices[pos] {
                break;
            }
            self.counters[pos] = 0;
        }
        Some(outcome)
    }
}

/// A Cartesian outcome space whose issues are all discrete.
///
/// The finiteness invariant is established at construction (continuous
/// issues are discretized to a default grid) and preserved by every
/// transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteOutcomeSpace {
    name: String,
    issues: Vec<Issue>,
}

impl DiscreteOutcomeSpace {
    /// Creates a discrete space, discretizing any continuous issue to the
    /// default grid.
    pub fn new(issues: Vec<Issue>) -> Result<Self, OutcomeError> {
        Self::with_name(issues, auto_name())
    }

    /// Creates a named discrete space, discretizing any continuous issue to
    /// the default grid.
    pub fn with_name(issues: Vec<Issue>, name: impl Into<String>) -> Result<Self, OutcomeError> {
        let issues = issues
            .into_iter()
            .map(|issue| {
                if issue.is_continuous() {
                    issue.to_discrete(DEFAULT_DISCRETE_LEVELS, false, true, true)
                } else {
                    Ok(issue)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            issues,
        })
    }

    /// Internal constructor for issue lists already known to be discrete.
    pub(crate) fn with_name_unchecked(issues: Vec<Issue>, name: String) -> Self {
        debug_assert!(issues.iter().all(Issue::is_discrete));
        Self { name, issues }
    }

    /// Rebuilds a discrete space from observed outcomes: one categorical
    /// issue per tuple position, holding the distinct values seen there in
    /// first-seen order.
    pub fn from_outcomes(
        outcomes: &[Outcome],
        issue_names: Option<Vec<String>>,
        name: Option<String>,
    ) -> Result<Self, OutcomeError> {
        let first = outcomes.first().ok_or(OutcomeError::EmptyOutcomeSet)?;
        let arity = first.len();
        for outcome in outcomes {
            if outcome.len() != arity {
                return Err(OutcomeError::ArityMismatch {
                    expected: arity,
                    actual: outcome.len(),
                });
            }
        }
        let names = match issue_names {
            Some(names) => {
                if names.len() != arity {
                    return Err(OutcomeError::ArityMismatch {
                        expected: arity,
                        actual: names.len(),
                    });
                }
                names
            }
            None => (0..arity).map(|k| format!("i{}", k)).collect(),
        };
        let issues = names
            .into_iter()
            .enumerate()
            .map(|(k, issue_name)| {
                let mut values: Vec<Value> = Vec::new();
                for outcome in outcomes {
                    if !values.contains(&outcome[k]) {
                        values.push(outcome[k].clone());
                    }
                }
                Issue::categorical_unchecked(issue_name, values)
            })
            .collect();
        Ok(Self {
            name: name.unwrap_or_else(auto_name),
            issues,
        })
    }

    /// Shrinks the space until its cardinality is within `max_cardinality`
    /// and every issue has at most `levels` values.
    ///
    /// Greedy: after clamping per-issue levels, the issue with the currently
    /// largest domain loses one value per step, re-evaluating after each
    /// step; ties go to the earliest issue. Issues already down to one value
    /// are skipped, and the loop stops once nothing is reducible, so an
    /// unreachable target yields the closest achievable space rather than
    /// spinning. A space already within bounds is returned unchanged.
    pub fn limit_cardinality(self, max_cardinality: Cardinality, levels: Cardinality) -> Self {
        let current: Vec<u128> = self
            .issues
            .iter()
            .map(|i| i.cardinality().as_finite().unwrap_or(1))
            .collect();
        let level_cap = levels.as_finite().unwrap_or(u128::MAX);
        let within_levels = current.iter().all(|&c| c <= level_cap);
        if !self.cardinality().exceeds(max_cardinality.as_finite().unwrap_or(u128::MAX))
            && within_levels
        {
            return self;
        }

        let mut targets: Vec<u128> = current.iter().map(|&c| c.min(level_cap).max(1)).collect();
        if let Cardinality::Finite(cap) = max_cardinality {
            loop {
                let product = targets
                    .iter()
                    .fold(1u128, |acc, &t| acc.saturating_mul(t));
                if product <= cap {
                    break;
                }
                // Largest reducible domain; strict comparison keeps the
                // earliest issue on ties.
                let mut pick: Option<usize> = None;
                for (k, &t) in targets.iter().enumerate() {
                    if t > 1 && pick.map_or(true, |p| t > targets[p]) {
                        pick = Some(k);
                    }
                }
                match pick {
                    Some(k) => {
                        targets[k] -= 1;
                        trace!(issue = k, level = targets[k], "reducing issue domain");
                    }
                    None => break,
                }
            }
        }

        let issues: Vec<Issue> = self
            .issues
            .iter()
            .zip(current.iter().zip(targets.iter()))
            .map(|(issue, (&card, &target))| {
                if target >= card {
                    issue.clone()
                } else {
                    let n = target.min(usize::MAX as u128) as usize;
                    issue
                        .to_discrete(n, true, true, true)
                        .unwrap_or_else(|_| issue.clone())
                }
            })
            .collect();
        Self {
            name: format!("{}-{}", self.name, max_cardinality),
            issues,
        }
    }

    /// Collapses the space into one synthetic issue whose values stand for
    /// full outcomes.
    ///
    /// `numeric` yields a contiguous `0..n` issue; otherwise `stringify`
    /// yields generated `v0..v(n-1)` labels, and the fallback keeps the full
    /// outcome tuples as values. Requires full enumeration; bound the space
    /// with [`DiscreteOutcomeSpace::limit_cardinality`] first. A space that
    /// is already single-issue passes through unchanged.
    pub fn to_single_issue(self, numeric: bool, stringify: bool) -> Self {
        if self.issues.len() == 1 {
            return self;
        }
        let joined = self.issue_names().join("-");
        let outcomes: Vec<Outcome> = self.enumerate().collect();
        let issue = if numeric {
            Issue::contiguous_unchecked(joined, 0, outcomes.len() as i64 - 1)
        } else if stringify {
            Issue::categorical_unchecked(
                joined,
                (0..outcomes.len())
                    .map(|k| Value::Text(format!("v{}", k)))
                    .collect(),
            )
        } else {
            Issue::categorical_unchecked(joined, outcomes.into_iter().map(Value::Tuple).collect())
        };
        Self {
            name: self.name,
            issues: vec![issue],
        }
    }
}

impl CartesianSpace for DiscreteOutcomeSpace {
    fn issues(&self) -> &[Issue] {
        &self.issues
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FiniteSpace for DiscreteOutcomeSpace {
    fn enumerate(&self) -> OutcomeIter<'_> {
        OutcomeIter::over(&self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_by_two() -> DiscreteOutcomeSpace {
        DiscreteOutcomeSpace::with_name(
            vec![
                Issue::contiguous("a", 0, 1).unwrap(),
                Issue::categorical("b", vec!["x", "y"]).unwrap(),
            ],
            "grid",
        )
        .unwrap()
    }

    #[test]
    fn enumeration_follows_odometer_order() {
        let space = two_by_two();
        let outs: Vec<Outcome> = space.enumerate().collect();
        assert_eq!(
            outs,
            vec![
                vec![Value::Int(0), Value::Text("x".into())],
                vec![Value::Int(0), Value::Text("y".into())],
                vec![Value::Int(1), Value::Text("x".into())],
                vec![Value::Int(1), Value::Text("y".into())],
            ]
        );
    }

    #[test]
    fn enumeration_restarts_fresh_each_call() {
        let space = two_by_two();
        let first: Vec<Outcome> = space.enumerate().collect();
        let second: Vec<Outcome> = space.enumerate().collect();
        assert_eq!(first, second);
        assert_eq!(first.len() as u128, space.exact_cardinality());
    }

    #[test]
    fn constructor_discretizes_continuous_issues() {
        let space = DiscreteOutcomeSpace::new(vec![
            Issue::continuous("x", 0.0, 1.0).unwrap(),
            Issue::contiguous("n", 0, 2).unwrap(),
        ])
        .unwrap();
        assert!(space.is_discrete());
        assert_eq!(
            space.exact_cardinality(),
            (DEFAULT_DISCRETE_LEVELS * 3) as u128
        );
    }

    #[test]
    fn limit_cardinality_is_identity_within_bounds() {
        let space = two_by_two();
        let same = space
            .clone()
            .limit_cardinality(Cardinality::Finite(10), Cardinality::Infinite);
        assert_eq!(same, space);
    }

    #[test]
    fn limit_cardinality_shrinks_to_the_cap() {
        let space = DiscreteOutcomeSpace::with_name(
            vec![
                Issue::contiguous("a", 0, 9).unwrap(),
                Issue::contiguous("b", 0, 4).unwrap(),
            ],
            "big",
        )
        .unwrap();
        let limited = space.limit_cardinality(Cardinality::Finite(12), Cardinality::Infinite);
        let card = limited.exact_cardinality();
        assert!(card <= 12);
        assert!(card >= 1);
        assert_eq!(limited.name(), "big-12");
    }

    #[test]
    fn limit_cardinality_shrinks_largest_issue_first() {
        let space = DiscreteOutcomeSpace::with_name(
            vec![
                Issue::contiguous("small", 0, 1).unwrap(),
                Issue::contiguous("large", 0, 9).unwrap(),
            ],
            "lopsided",
        )
        .unwrap();
        let limited = space.limit_cardinality(Cardinality::Finite(18), Cardinality::Infinite);
        // Only the ten-value issue shrinks: 2 * 9 = 18.
        assert_eq!(limited.issues()[0].cardinality(), Cardinality::Finite(2));
        assert_eq!(limited.issues()[1].cardinality(), Cardinality::Finite(9));
    }

    #[test]
    fn limit_cardinality_clamps_per_issue_levels() {
        let space = DiscreteOutcomeSpace::with_name(
            vec![
                Issue::contiguous("a", 0, 9).unwrap(),
                Issue::contiguous("b", 0, 9).unwrap(),
            ],
            "even",
        )
        .unwrap();
        let limited =
            space.limit_cardinality(Cardinality::Infinite, Cardinality::Finite(4));
        assert!(limited
            .issues()
            .iter()
            .all(|i| !i.cardinality().exceeds(4)));
    }

    #[test]
    fn limit_cardinality_terminates_when_target_unreachable() {
        let space = DiscreteOutcomeSpace::with_name(
            vec![
                Issue::categorical("a", vec!["only"]).unwrap(),
                Issue::categorical("b", vec!["one"]).unwrap(),
            ],
            "tiny",
        )
        .unwrap();
        // Cardinality 1 cannot be reduced below 1; the call must return
        // rather than scan forever.
        let limited = space.limit_cardinality(Cardinality::Finite(0), Cardinality::Infinite);
        assert_eq!(limited.exact_cardinality(), 1);
    }

    #[test]
    fn to_single_issue_numeric_builds_contiguous_index() {
        let space = two_by_two().to_single_issue(true, false);
        assert_eq!(space.issues().len(), 1);
        let issue = &space.issues()[0];
        assert_eq!(issue.name(), "a-b");
        assert_eq!(issue.cardinality(), Cardinality::Finite(4));
        assert!(issue.is_integer());
    }

    #[test]
    fn to_single_issue_stringify_builds_labels() {
        let space = two_by_two().to_single_issue(false, true);
        let issue = &space.issues()[0];
        assert_eq!(issue.value_at(0), Some(Value::Text("v0".into())));
        assert_eq!(issue.value_at(3), Some(Value::Text("v3".into())));
    }

    #[test]
    fn to_single_issue_tuples_preserve_outcomes() {
        let original: Vec<Outcome> = two_by_two().enumerate().collect();
        let space = two_by_two().to_single_issue(false, false);
        let issue = &space.issues()[0];
        assert_eq!(
            issue.value_at(0),
            Some(Value::Tuple(original[0].clone()))
        );
        assert_eq!(
            issue.value_at(3),
            Some(Value::Tuple(original[3].clone()))
        );
    }

    #[test]
    fn to_single_issue_is_identity_on_single_issue_spaces() {
        let space = DiscreteOutcomeSpace::with_name(
            vec![Issue::categorical("a", vec!["x", "y"]).unwrap()],
            "solo",
        )
        .unwrap();
        let same = space.clone().to_single_issue(true, true);
        assert_eq!(same, space);
    }

    #[test]
    fn from_outcomes_rebuilds_a_space_holding_every_input() {
        let outcomes = vec![
            vec![Value::Int(1), Value::Text("a".into())],
            vec![Value::Int(2), Value::Text("a".into())],
            vec![Value::Int(1), Value::Text("b".into())],
        ];
        let space = DiscreteOutcomeSpace::from_outcomes(
            &outcomes,
            Some(vec!["n".into(), "s".into()]),
            None,
        )
        .unwrap();
        assert_eq!(space.issue_names(), vec!["n", "s"]);
        assert!(outcomes.iter().all(|o| space.is_valid(o)));
    }

    #[test]
    fn from_outcomes_rejects_empty_and_ragged_input() {
        assert!(matches!(
            DiscreteOutcomeSpace::from_outcomes(&[], None, None).unwrap_err(),
            OutcomeError::EmptyOutcomeSet
        ));
        let ragged = vec![vec![Value::Int(1)], vec![Value::Int(1), Value::Int(2)]];
        assert!(matches!(
            DiscreteOutcomeSpace::from_outcomes(&ragged, None, None).unwrap_err(),
            OutcomeError::ArityMismatch { .. }
        ));
    }

    proptest! {
        #[test]
        fn enumeration_length_matches_cardinality(a in 1usize..5, b in 1usize..5, c in 1usize..4) {
            let space = DiscreteOutcomeSpace::with_name(
                vec![
                    Issue::contiguous("a", 0, a as i64 - 1).unwrap(),
                    Issue::contiguous("b", 0, b as i64 - 1).unwrap(),
                    Issue::contiguous("c", 0, c as i64 - 1).unwrap(),
                ],
                "prop",
            )
            .unwrap();
            let outs: Vec<Outcome> = space.enumerate().collect();
            prop_assert_eq!(outs.len(), a * b * c);
            prop_assert_eq!(outs.len() as u128, space.exact_cardinality());
        }

        #[test]
        fn limited_spaces_never_exceed_the_cap(cap in 1u128..40) {
            let space = DiscreteOutcomeSpace::with_name(
                vec![
                    Issue::contiguous("a", 0, 5).unwrap(),
                    Issue::contiguous("b", 0, 6).unwrap(),
                ],
                "prop",
            )
            .unwrap();
            let limited = space.limit_cardinality(Cardinality::Finite(cap), Cardinality::Infinite);
            prop_assert!(limited.exact_cardinality() <= cap.max(1));
        }
    }
}
