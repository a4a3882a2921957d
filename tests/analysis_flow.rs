//! Integration tests for the full analysis flow.
//!
//! These tests verify the end-to-end pipeline:
//! 1. An outcome space is built from issues and discretized as needed
//! 2. Candidates are enumerated deterministically
//! 3. Each party's utility function is evaluated over the candidates
//! 4. The Pareto frontier, Nash point, and difficulty indices are derived
//!
//! Uses closure-backed utility functions so no external collaborator is
//! needed.

use rand::rngs::StdRng;
use rand::SeedableRng;

use parley::outcomes::{
    integer_outcomes, Cardinality, CartesianOutcomeSpace, CartesianSpace, DiscreteOutcomeSpace,
    FiniteSpace, Issue, Outcome, Value,
};
use parley::preferences::{
    conflict_level, make_discounted_ufun, nash_point, opposition_level, pareto_frontier,
    DiscountParams, MappingUtilityFunction, SessionClock, UtilityFunction,
};

// =============================================================================
// Test Utilities
// =============================================================================

/// u(x) = x / 9 over single-integer outcomes.
fn rising() -> MappingUtilityFunction {
    MappingUtilityFunction::from_fn(|o: &Outcome| {
        o.first().and_then(Value::as_real).unwrap_or(0.0) / 9.0
    })
    .with_reserved_value(0.0)
}

/// u(x) = 1 - x / 9 over single-integer outcomes.
fn falling() -> MappingUtilityFunction {
    MappingUtilityFunction::from_fn(|o: &Outcome| {
        1.0 - o.first().and_then(Value::as_real).unwrap_or(0.0) / 9.0
    })
    .with_reserved_value(0.0)
}

// =============================================================================
// Space construction and enumeration
// =============================================================================

#[test]
fn space_pipeline_from_issues_to_candidates() {
    let space = CartesianOutcomeSpace::with_name(
        vec![
            Issue::categorical("payment", vec!["cash", "credit"]).unwrap(),
            Issue::contiguous("quantity", 1, 5).unwrap(),
            Issue::continuous("price", 10.0, 20.0).unwrap(),
        ],
        "deal",
    );
    assert_eq!(space.cardinality(), Cardinality::Infinite);

    let discrete = space.to_discrete(4, Cardinality::Finite(100)).unwrap();
    assert_eq!(discrete.exact_cardinality(), 2 * 5 * 4);

    let first: Vec<Outcome> = discrete.enumerate().collect();
    let second: Vec<Outcome> = discrete.enumerate().collect();
    assert_eq!(first, second);
    assert_eq!(first.len() as u128, discrete.exact_cardinality());
    assert!(first.iter().all(|o| discrete.is_valid(o)));
}

#[test]
fn capacity_limits_are_checked_before_any_work() {
    let space = CartesianOutcomeSpace::new(vec![
        Issue::continuous("a", 0.0, 1.0).unwrap(),
        Issue::continuous("b", 0.0, 1.0).unwrap(),
    ]);
    assert!(space.to_discrete(100, Cardinality::Finite(50)).is_err());
}

#[test]
fn limited_space_collapses_to_a_single_tractable_issue() {
    let space = DiscreteOutcomeSpace::with_name(
        vec![
            Issue::contiguous("a", 0, 9).unwrap(),
            Issue::contiguous("b", 0, 9).unwrap(),
        ],
        "wide",
    )
    .unwrap();
    let collapsed = space
        .limit_cardinality(Cardinality::Finite(20), Cardinality::Infinite)
        .to_single_issue(true, false);
    assert_eq!(collapsed.issues().len(), 1);
    assert!(collapsed.exact_cardinality() <= 20);
}

// =============================================================================
// Frontier and Nash point over a pure tradeoff line
// =============================================================================

#[test]
fn tradeoff_line_frontier_and_nash_point() {
    let (u1, u2) = (rising(), falling());
    let ufuns: Vec<&dyn UtilityFunction> = vec![&u1, &u2];
    let outcomes = integer_outcomes(10);

    // Every point of a pure tradeoff line is efficient.
    let (frontier, indices) = pareto_frontier(&ufuns, Some(&outcomes), None, 10, false).unwrap();
    assert_eq!(frontier.len(), 10);
    assert_eq!(indices.len(), 10);

    // With reservations at zero and maxima at one, the Nash product
    // x/9 * (9 - x)/9 peaks between x = 4 and x = 5.
    let (point, idx) = nash_point(&ufuns, &frontier, None, Some(&outcomes))
        .unwrap()
        .unwrap();
    let x = (point[0] * 9.0).round() as i64;
    assert!(x == 4 || x == 5);
    assert_eq!(frontier[idx], point);
}

#[test]
fn frontier_over_an_issue_space_matches_explicit_outcomes() {
    let (u1, u2) = (rising(), falling());
    let ufuns: Vec<&dyn UtilityFunction> = vec![&u1, &u2];
    let issues = vec![Issue::contiguous("x", 0, 9).unwrap()];
    let outcomes = integer_outcomes(10);

    let (from_issues, _) = pareto_frontier(&ufuns, None, Some(&issues), 10, false).unwrap();
    let (from_outcomes, _) = pareto_frontier(&ufuns, Some(&outcomes), None, 10, false).unwrap();
    assert_eq!(from_issues, from_outcomes);
}

// =============================================================================
// Difficulty indices
// =============================================================================

#[test]
fn indices_separate_aligned_from_opposed_preferences() {
    let outcomes = integer_outcomes(10);
    let (u1, u2) = (rising(), falling());
    let same = rising();

    let aligned: Vec<&dyn UtilityFunction> = vec![&same, &same];
    let opposed: Vec<&dyn UtilityFunction> = vec![&u1, &u2];

    let aligned_opposition =
        opposition_level(&aligned, &[1.0, 1.0], Some(&outcomes), None, 10_000).unwrap();
    let opposed_opposition =
        opposition_level(&opposed, &[1.0, 1.0], Some(&outcomes), None, 10_000).unwrap();
    assert!(aligned_opposition.abs() < 1e-9);
    assert!(opposed_opposition > aligned_opposition);

    let mut rng = StdRng::seed_from_u64(17);
    assert_eq!(
        conflict_level(&mut rng, &same, &same, &outcomes, 10_000).unwrap(),
        0.0
    );
    let mut rng = StdRng::seed_from_u64(17);
    assert_eq!(
        conflict_level(&mut rng, &u1, &u2, &outcomes, 10_000).unwrap(),
        1.0
    );
}

// =============================================================================
// Discounted composition in a session
// =============================================================================

#[test]
fn discounted_ufun_degrades_as_the_session_drags() {
    let params = DiscountParams {
        cost_per_step: Some(0.05),
        discount_per_step: Some(0.95),
        ..DiscountParams::default()
    };
    let u = make_discounted_ufun(Box::new(rising()), &params);
    let best: Outcome = vec![Value::Int(9)];

    let now = u.evaluate_at(&best, &SessionClock::start());
    let later = u.evaluate_at(&best, &SessionClock::at_step(5));
    assert!((now - 1.0).abs() < 1e-12);
    assert!(later < now);
    // Cost first, then discount: (1.0 - 0.05 * 5) * 0.95^5.
    let expected = (1.0 - 0.25) * 0.95f64.powi(5);
    assert!((later - expected).abs() < 1e-12);
}

// =============================================================================
// Seeded sampling is reproducible
// =============================================================================

#[test]
fn sampling_with_a_fixed_seed_is_deterministic() {
    let space = CartesianOutcomeSpace::new(vec![
        Issue::contiguous("a", 0, 99).unwrap(),
        Issue::continuous("b", 0.0, 1.0).unwrap(),
    ]);
    let mut rng1 = StdRng::seed_from_u64(1234);
    let mut rng2 = StdRng::seed_from_u64(1234);
    let s1 = space.sample(&mut rng1, 25, false, true).unwrap();
    let s2 = space.sample(&mut rng2, 25, false, true).unwrap();
    assert_eq!(s1, s2);
}
