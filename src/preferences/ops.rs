//! Multi-criteria analysis over utility functions and outcome spaces.
//!
//! Pure functions: Pareto frontier extraction, the Nash bargaining point,
//! normalization, and the negotiation-difficulty indices (opposition,
//! conflict, win-win). Candidates come from an explicit outcome list when
//! one is given, otherwise from a discretized enumeration of the issues.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::{debug, warn};

use super::errors::AnalysisError;
use super::ufun::{UtilityFunction, DEFAULT_MAX_CARDINALITY};
use crate::outcomes::{ops as outcome_ops, Issue, Outcome, DEFAULT_DISCRETE_LEVELS};

/// Builds the candidate set shared by the analysis functions: explicit
/// outcomes take priority; otherwise the issues are discretized to `levels`
/// and enumerated. Caps are hard limits.
pub(crate) fn candidate_outcomes(
    outcomes: Option<&[Outcome]>,
    issues: Option<&[Issue]>,
    levels: usize,
    max_cardinality: Option<usize>,
) -> Result<Vec<Outcome>, AnalysisError> {
    if let Some(outs) = outcomes {
        return Ok(match max_cardinality {
            Some(cap) => outs.iter().take(cap).cloned().collect(),
            None => outs.to_vec(),
        });
    }
    let issues = issues.ok_or(AnalysisError::MissingCandidates)?;
    Ok(outcome_ops::discretize_and_enumerate(
        issues,
        levels,
        max_cardinality,
    )?)
}

/// Returns true if `a` is weakly better everywhere and strictly better
/// somewhere.
fn weakly_dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b.iter()) {
        if x < y {
            return false;
        }
        if x > y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Finds the Pareto frontier over the candidate outcomes.
///
/// Candidates are the explicit `outcomes` when given, otherwise the
/// discretized enumeration of `issues` at `n_discretization` levels. The
/// scan is seeded by sorting candidates descending on the first criterion
/// (stable, so ties keep original index order); each candidate drops every
/// frontier member it weakly dominates, is rejected if any member weakly
/// dominates it, and otherwise joins the frontier. Exact utility ties
/// coalesce to the first-seen index.
///
/// Returns aligned lists: the utility vector and the candidate index of each
/// frontier member. `sort_by_welfare` reorders the result descending by
/// summed utility; it changes presentation only.
pub fn pareto_frontier(
    ufuns: &[&dyn UtilityFunction],
    outcomes: Option<&[Outcome]>,
    issues: Option<&[Issue]>,
    n_discretization: usize,
    sort_by_welfare: bool,
) -> Result<(Vec<Vec<f64>>, Vec<usize>), AnalysisError> {
    let candidates = candidate_outcomes(outcomes, issues, n_discretization, None)?;
    debug!(
        candidates = candidates.len(),
        parties = ufuns.len(),
        "computing pareto frontier"
    );
    let utils: Vec<Vec<f64>> = candidates
        .iter()
        .map(|o| ufuns.iter().map(|u| u.evaluate(o)).collect())
        .collect();

    let mut order: Vec<usize> = (0..utils.len()).collect();
    order.sort_by(|&a, &b| {
        utils[b]
            .first()
            .partial_cmp(&utils[a].first())
            .unwrap_or(Ordering::Equal)
    });

    let mut frontier: Vec<(usize, Vec<f64>)> = Vec::new();
    'scan: for &idx in &order {
        let current = &utils[idx];
        for (_, member) in &frontier {
            if member == current || weakly_dominates(member, current) {
                continue 'scan;
            }
        }
        frontier.retain(|(_, member)| !weakly_dominates(current, member));
        frontier.push((idx, current.clone()));
    }

    if sort_by_welfare {
        frontier.sort_by(|a, b| {
            let wa: f64 = a.1.iter().sum();
            let wb: f64 = b.1.iter().sum();
            wb.partial_cmp(&wa).unwrap_or(Ordering::Equal)
        });
    }
    Ok(frontier.into_iter().map(|(idx, us)| (us, idx)).unzip())
}

/// Finds the Nash bargaining point on a previously computed frontier.
///
/// Each frontier point is scored by the product over parties of
/// `(utility - reservation) / (max - reservation)`; the strict maximizer
/// wins, earliest-scanned point on ties. Returns `None` when any party's
/// reservation or maximum utility is unknown or unbounded, or any maximum is
/// within `1e-9` of zero: an absent Nash point is an expected, recoverable
/// result, not an error.
pub fn nash_point(
    ufuns: &[&dyn UtilityFunction],
    frontier: &[Vec<f64>],
    issues: Option<&[Issue]>,
    outcomes: Option<&[Outcome]>,
) -> Result<Option<(Vec<f64>, usize)>, AnalysisError> {
    let mut reserves = Vec::with_capacity(ufuns.len());
    for ufun in ufuns {
        match ufun.reserved_value() {
            Some(r) if r.is_finite() => reserves.push(r),
            _ => return Ok(None),
        }
    }
    let mut maxs = Vec::with_capacity(ufuns.len());
    for ufun in ufuns {
        let (_, mx) = ufun.utility_range(
            issues,
            outcomes,
            f64::NEG_INFINITY,
            DEFAULT_MAX_CARDINALITY,
        )?;
        if !mx.is_finite() {
            return Ok(None);
        }
        maxs.push(mx);
    }
    if maxs.iter().any(|m| m.abs() <= 1e-9) {
        return Ok(None);
    }
    let diffs: Vec<f64> = maxs
        .iter()
        .zip(reserves.iter())
        .map(|(m, r)| m - r)
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for (idx, point) in frontier.iter().enumerate() {
        let score: f64 = point
            .iter()
            .zip(reserves.iter().zip(diffs.iter()))
            .map(|(u, (r, d))| (u - r) / d)
            .product();
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    Ok(best.map(|(idx, _)| (frontier[idx].clone(), idx)))
}

/// Rescales `ufun` in place so its utilities over `outcomes` span `range`.
pub fn normalize(
    ufun: &mut dyn UtilityFunction,
    outcomes: &[Outcome],
    range: (f64, f64),
    infeasible_cutoff: f64,
    epsilon: f64,
) -> Result<(), AnalysisError> {
    ufun.normalize(outcomes, range, infeasible_cutoff, epsilon)
}

/// The minimum and maximum utility of `ufun` over the candidate set.
pub fn utility_range(
    ufun: &dyn UtilityFunction,
    issues: Option<&[Issue]>,
    outcomes: Option<&[Outcome]>,
    infeasible_cutoff: f64,
    max_cardinality: usize,
) -> Result<(f64, f64), AnalysisError> {
    ufun.utility_range(issues, outcomes, infeasible_cutoff, max_cardinality)
}

/// The outcomes of minimum and maximum utility, in that order.
pub fn extreme_outcomes(
    ufun: &dyn UtilityFunction,
    issues: Option<&[Issue]>,
    outcomes: Option<&[Outcome]>,
    infeasible_cutoff: f64,
    max_cardinality: usize,
) -> Result<(Outcome, Outcome), AnalysisError> {
    ufun.extreme_outcomes(issues, outcomes, infeasible_cutoff, max_cardinality)
}

/// An outcome whose utility falls in the inclusive `range`, or `None` after
/// `n_trials` draws.
pub fn sample_outcome_with_utility(
    ufun: &dyn UtilityFunction,
    rng: &mut dyn RngCore,
    range: (f64, f64),
    issues: Option<&[Issue]>,
    outcomes: Option<&[Outcome]>,
    n_trials: usize,
) -> Result<Option<Outcome>, AnalysisError> {
    ufun.sample_outcome_with_utility(rng, range, issues, outcomes, n_trials)
}

/// The opposition level of the parties: the minimum distance, over
/// candidates, to the ideal point in normalized-utility space,
/// `sqrt(sum_i (1 - u_i(o) / max_i)^2)`.
///
/// Zero means some outcome gives every party its maximum simultaneously;
/// larger values mean the preferences pull apart. Every `max_utils[i]` must
/// be nonzero.
pub fn opposition_level(
    ufuns: &[&dyn UtilityFunction],
    max_utils: &[f64],
    outcomes: Option<&[Outcome]>,
    issues: Option<&[Issue]>,
    max_tests: usize,
) -> Result<f64, AnalysisError> {
    if ufuns.len() != max_utils.len() {
        return Err(AnalysisError::LengthMismatch {
            ufuns: ufuns.len(),
            max_utils: max_utils.len(),
        });
    }
    for (index, m) in max_utils.iter().enumerate() {
        if m.abs() < 1e-7 {
            return Err(AnalysisError::ZeroMaxUtility { index });
        }
    }
    let candidates = candidate_outcomes(
        outcomes,
        issues,
        DEFAULT_DISCRETE_LEVELS,
        Some(max_tests),
    )?;
    if candidates.is_empty() {
        return Err(AnalysisError::MissingCandidates);
    }
    let mut nearest = f64::INFINITY;
    for outcome in &candidates {
        let v: f64 = ufuns
            .iter()
            .zip(max_utils.iter())
            .map(|(u, m)| (1.0 - u.evaluate(outcome) / m).powi(2))
            .sum();
        if !v.is_finite() {
            warn!(?outcome, "non-finite utility in opposition scan");
        }
        if v < nearest {
            nearest = v;
        }
    }
    Ok(nearest.sqrt())
}

/// The conflict level of two parties: the fraction of sampled outcome pairs
/// over which the two utilities move in opposite directions, so one party's
/// gain is the other's loss.
///
/// Pairs are drawn from a randomly ordered copy of `outcomes`, at most
/// `max_tests` of them; pairs where neither utility changes are excluded
/// from the denominator. `1.0` is strictly zero-sum, `0.0` is fully aligned.
pub fn conflict_level<R: Rng + ?Sized>(
    rng: &mut R,
    u1: &dyn UtilityFunction,
    u2: &dyn UtilityFunction,
    outcomes: &[Outcome],
    max_tests: usize,
) -> Result<f64, AnalysisError> {
    let points: Vec<(f64, f64)> = outcomes
        .iter()
        .map(|o| (u1.evaluate(o), u2.evaluate(o)))
        .collect();
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.shuffle(rng);

    let mut opposed = 0usize;
    let mut counted = 0usize;
    let mut trials = 0usize;
    'scan: for i in 0..order.len() {
        for j in (i + 1)..order.len() {
            if trials >= max_tests {
                break 'scan;
            }
            trials += 1;
            let (a1, a2) = points[order[i]];
            let (b1, b2) = points[order[j]];
            if b1 == a1 && a2 == b2 {
                continue;
            }
            counted += 1;
            if (b1 > a1 && a2 > b2) || (b1 < a1 && a2 < b2) {
                opposed += 1;
            }
        }
    }
    if counted == 0 {
        return Err(AnalysisError::NoComparablePairs);
    }
    Ok(opposed as f64 / counted as f64)
}

/// The win-win level of two parties: the mean joint gain over adjacent pairs
/// of a randomly ordered copy of `outcomes`, measuring how much simultaneous
/// improvement moving between outcomes can deliver.
pub fn winwin_level<R: Rng + ?Sized>(
    rng: &mut R,
    u1: &dyn UtilityFunction,
    u2: &dyn UtilityFunction,
    outcomes: &[Outcome],
    max_tests: usize,
) -> Result<f64, AnalysisError> {
    let points: Vec<(f64, f64)> = outcomes
        .iter()
        .map(|o| (u1.evaluate(o), u2.evaluate(o)))
        .collect();
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.shuffle(rng);

    let mut gains: Vec<f64> = Vec::new();
    for (trial, pair) in order.windows(2).enumerate() {
        if trial >= max_tests {
            break;
        }
        let (a1, a2) = points[pair[0]];
        let (b1, b2) = points[pair[1]];
        let win = if a1 == b1 {
            if a2 == b2 {
                continue;
            }
            (b2 - a2).abs()
        } else if a1 < b1 {
            if a2 == b2 {
                b1 - a1
            } else {
                (b1 - a1) + (b2 - a2)
            }
        } else if a2 == b2 {
            a1 - b1
        } else {
            (a1 - b1) + (b2 - a2)
        };
        gains.push(win);
    }
    if gains.is_empty() {
        return Err(AnalysisError::NoComparablePairs);
    }
    Ok(gains.iter().sum::<f64>() / gains.len() as f64)
}
