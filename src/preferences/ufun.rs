//! The utility-function capability consumed by the analysis engine.

use rand::{Rng, RngCore};

use super::discounted::SessionClock;
use super::errors::AnalysisError;
use super::ops::candidate_outcomes;
use crate::outcomes::{Issue, Outcome, DEFAULT_DISCRETE_LEVELS};

/// Default brute-force budget for range and extreme computations.
pub const DEFAULT_MAX_CARDINALITY: usize = 1000;

/// A scalar preference over outcomes.
///
/// `evaluate` and the rescale primitives are required; everything else has a
/// brute-force default bounded by the caller's caps. Implementations must
/// apply `shift_by`/`scale_by` to the reservation value as well as to
/// utilities, so normalization keeps the two consistent.
pub trait UtilityFunction {
    /// The utility of `outcome`.
    fn evaluate(&self, outcome: &Outcome) -> f64;

    /// The utility of no agreement, when known.
    fn reserved_value(&self) -> Option<f64> {
        None
    }

    /// Adds `offset` to every utility and to the reservation value.
    fn shift_by(&mut self, offset: f64);

    /// Multiplies every utility and the reservation value by `factor`.
    fn scale_by(&mut self, factor: f64);

    /// The utility of `outcome` at a point in negotiation time. Only
    /// time-discounted wrappers read the clock.
    fn evaluate_at(&self, outcome: &Outcome, _clock: &SessionClock) -> f64 {
        self.evaluate(outcome)
    }

    /// The reservation value at a point in negotiation time.
    fn reserved_value_at(&self, _clock: &SessionClock) -> Option<f64> {
        self.reserved_value()
    }

    /// The outcomes of minimum and maximum utility, in that order.
    ///
    /// Brute force over explicit `outcomes` or a discretized enumeration of
    /// `issues`, testing at most `max_cardinality` candidates and ignoring
    /// utilities below `infeasible_cutoff`.
    fn extreme_outcomes(
        &self,
        issues: Option<&[Issue]>,
        outcomes: Option<&[Outcome]>,
        infeasible_cutoff: f64,
        max_cardinality: usize,
    ) -> Result<(Outcome, Outcome), AnalysisError> {
        let candidates = candidate_outcomes(
            outcomes,
            issues,
            DEFAULT_DISCRETE_LEVELS,
            Some(max_cardinality),
        )?;
        let mut worst: Option<(usize, f64)> = None;
        let mut best: Option<(usize, f64)> = None;
        for (k, outcome) in candidates.iter().enumerate() {
            let u = self.evaluate(outcome);
            if u < infeasible_cutoff {
                continue;
            }
            if worst.map_or(true, |(_, w)| u < w) {
                worst = Some((k, u));
            }
            if best.map_or(true, |(_, b)| u > b) {
                best = Some((k, u));
            }
        }
        match (worst, best) {
            (Some((w, _)), Some((b, _))) => {
                Ok((candidates[w].clone(), candidates[b].clone()))
            }
            _ => Err(AnalysisError::NoFeasibleOutcomes),
        }
    }

    /// The minimum and maximum utility over the same candidate set as
    /// [`UtilityFunction::extreme_outcomes`].
    fn utility_range(
        &self,
        issues: Option<&[Issue]>,
        outcomes: Option<&[Outcome]>,
        infeasible_cutoff: f64,
        max_cardinality: usize,
    ) -> Result<(f64, f64), AnalysisError> {
        let (worst, best) =
            self.extreme_outcomes(issues, outcomes, infeasible_cutoff, max_cardinality)?;
        Ok((self.evaluate(&worst), self.evaluate(&best)))
    }

    /// Rescales in place so the utilities over `outcomes` span `range`.
    ///
    /// Utilities below `infeasible_cutoff` are ignored. When the observed
    /// span is smaller than `epsilon` the function is only shifted onto the
    /// range minimum; there is nothing meaningful to scale.
    fn normalize(
        &mut self,
        outcomes: &[Outcome],
        range: (f64, f64),
        infeasible_cutoff: f64,
        epsilon: f64,
    ) -> Result<(), AnalysisError> {
        let mut mn = f64::INFINITY;
        let mut mx = f64::NEG_INFINITY;
        let mut any = false;
        for outcome in outcomes {
            let u = self.evaluate(outcome);
            if u < infeasible_cutoff {
                continue;
            }
            any = true;
            mn = mn.min(u);
            mx = mx.max(u);
        }
        if !any {
            return Err(AnalysisError::NoFeasibleOutcomes);
        }
        if (mx - mn).abs() < epsilon {
            self.shift_by(range.0 - mn);
            return Ok(());
        }
        let scale = (range.1 - range.0) / (mx - mn);
        self.scale_by(scale);
        self.shift_by(range.0 - mn * scale);
        Ok(())
    }

    /// Draws candidates until one lands inside the inclusive utility
    /// `range`, giving up after `n_trials`.
    fn sample_outcome_with_utility(
        &self,
        rng: &mut dyn RngCore,
        range: (f64, f64),
        issues: Option<&[Issue]>,
        outcomes: Option<&[Outcome]>,
        n_trials: usize,
    ) -> Result<Option<Outcome>, AnalysisError> {
        let in_range = |u: f64| u >= range.0 && u <= range.1;
        if let Some(outs) = outcomes {
            if outs.is_empty() {
                return Ok(None);
            }
            for _ in 0..n_trials {
                let outcome = &outs[rng.gen_range(0..outs.len())];
                if in_range(self.evaluate(outcome)) {
                    return Ok(Some(outcome.clone()));
                }
            }
            return Ok(None);
        }
        let issues = issues.ok_or(AnalysisError::MissingCandidates)?;
        for _ in 0..n_trials {
            let outcome: Outcome = issues.iter().map(|i| i.sample_one(&mut *rng)).collect();
            if in_range(self.evaluate(&outcome)) {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcomes::{integer_outcomes, Value};
    use crate::preferences::MappingUtilityFunction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn index_ufun() -> MappingUtilityFunction {
        MappingUtilityFunction::from_fn(|o: &Outcome| {
            o.first().and_then(Value::as_real).unwrap_or(0.0)
        })
    }

    #[test]
    fn default_extremes_scan_explicit_outcomes() {
        let u = index_ufun();
        let outs = integer_outcomes(10);
        let (worst, best) = u
            .extreme_outcomes(None, Some(&outs), f64::NEG_INFINITY, 1000)
            .unwrap();
        assert_eq!(worst, vec![Value::Int(0)]);
        assert_eq!(best, vec![Value::Int(9)]);
    }

    #[test]
    fn default_range_enumerates_issues() {
        let u = index_ufun();
        let issues = vec![Issue::contiguous("x", 2, 7).unwrap()];
        let (mn, mx) = u
            .utility_range(Some(&issues), None, f64::NEG_INFINITY, 1000)
            .unwrap();
        assert_eq!((mn, mx), (2.0, 7.0));
    }

    #[test]
    fn infeasible_cutoff_excludes_candidates() {
        let u = index_ufun();
        let outs = integer_outcomes(10);
        let (mn, mx) = u.utility_range(None, Some(&outs), 3.0, 1000).unwrap();
        assert_eq!((mn, mx), (3.0, 9.0));
    }

    #[test]
    fn max_cardinality_is_a_hard_limit() {
        let u = index_ufun();
        let issues = vec![Issue::contiguous("x", 0, 999).unwrap()];
        // Only the first 10 candidates may be inspected.
        let (_, mx) = u
            .utility_range(Some(&issues), None, f64::NEG_INFINITY, 10)
            .unwrap();
        assert!(mx <= 9.0);
    }

    #[test]
    fn normalize_maps_the_span_onto_the_range() {
        let mut u = index_ufun();
        let outs = integer_outcomes(10);
        u.normalize(&outs, (0.0, 1.0), f64::NEG_INFINITY, 1e-6)
            .unwrap();
        let (mn, mx) = u
            .utility_range(None, Some(&outs), f64::NEG_INFINITY, 1000)
            .unwrap();
        assert!(mn.abs() < 1e-9);
        assert!((mx - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_rescales_the_reservation_consistently() {
        let mut u = index_ufun().with_reserved_value(4.5);
        let outs = integer_outcomes(10);
        u.normalize(&outs, (0.0, 1.0), f64::NEG_INFINITY, 1e-6)
            .unwrap();
        assert!((u.reserved_value().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_shifts_a_flat_function_without_scaling() {
        let mut u = MappingUtilityFunction::from_fn(|_: &Outcome| 7.0);
        let outs = integer_outcomes(4);
        u.normalize(&outs, (0.0, 1.0), f64::NEG_INFINITY, 1e-6)
            .unwrap();
        assert!(u.evaluate(&outs[0]).abs() < 1e-9);
    }

    #[test]
    fn sample_outcome_with_utility_respects_the_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let u = index_ufun();
        let outs = integer_outcomes(10);
        let found = u
            .sample_outcome_with_utility(&mut rng, (7.0, 9.0), None, Some(&outs), 200)
            .unwrap()
            .unwrap();
        let v = u.evaluate(&found);
        assert!((7.0..=9.0).contains(&v));
    }

    #[test]
    fn sample_outcome_with_utility_reports_not_found() {
        let mut rng = StdRng::seed_from_u64(9);
        let u = index_ufun();
        let outs = integer_outcomes(10);
        let found = u
            .sample_outcome_with_utility(&mut rng, (100.0, 200.0), None, Some(&outs), 50)
            .unwrap();
        assert!(found.is_none());
    }
}
