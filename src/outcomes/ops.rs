//! Candidate-set builders shared by the analysis engine and external callers.

use super::discrete::OutcomeIter;
use super::{Issue, Outcome, OutcomeError};

/// Enumerates the full product of discrete `issues`, truncated to
/// `max_cardinality` outcomes when a cap is given.
///
/// Enumerating a space with continuous issues is disallowed; discretize
/// first (see [`discretize_and_enumerate`]).
pub fn enumerate_issues(
    issues: &[Issue],
    max_cardinality: Option<usize>,
) -> Result<Vec<Outcome>, OutcomeError> {
    if issues.iter().any(Issue::is_continuous) {
        return Err(OutcomeError::InfiniteEnumeration);
    }
    let iter = OutcomeIter::over(issues);
    Ok(match max_cardinality {
        Some(cap) => iter.take(cap).collect(),
        None => iter.collect(),
    })
}

/// Discretizes continuous issues to `levels` grid values, then enumerates,
/// truncating to `max_cardinality` outcomes when a cap is given.
pub fn discretize_and_enumerate(
    issues: &[Issue],
    levels: usize,
    max_cardinality: Option<usize>,
) -> Result<Vec<Outcome>, OutcomeError> {
    let discrete: Vec<Issue> = issues
        .iter()
        .map(|issue| {
            if issue.is_continuous() {
                issue.to_discrete(levels, false, true, true)
            } else {
                Ok(issue.clone())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    enumerate_issues(&discrete, max_cardinality)
}
