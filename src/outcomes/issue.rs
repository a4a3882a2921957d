//! Issues - single negotiable dimensions with a value domain.
//!
//! An issue is one attribute of an agreement: a categorical set, an inclusive
//! integer range, or a continuous real interval. Issues are immutable once
//! built and owned exclusively by their outcome space.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Cardinality, OutcomeError, Value};

/// A single negotiable dimension.
///
/// The variant decides the value domain; every operation dispatches on it.
/// Construction validates the domain, so a held `Issue` is always usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Issue {
    Categorical(CategoricalIssue),
    Contiguous(ContiguousIssue),
    Continuous(ContinuousIssue),
}

/// An explicit, ordered, non-empty set of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalIssue {
    name: String,
    values: Vec<Value>,
}

/// An inclusive integer range `min..=max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContiguousIssue {
    name: String,
    min: i64,
    max: i64,
}

/// A continuous real interval `[min, max]` with `min < max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousIssue {
    name: String,
    min: f64,
    max: f64,
}

impl CategoricalIssue {
    /// The issue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered value domain.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl ContiguousIssue {
    /// The issue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The inclusive lower bound.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// The inclusive upper bound.
    pub fn max(&self) -> i64 {
        self.max
    }
}

impl ContinuousIssue {
    /// The issue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interval lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// The interval upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Issue {
    /// Creates a categorical issue from an ordered value list.
    pub fn categorical(
        name: impl Into<String>,
        values: Vec<impl Into<Value>>,
    ) -> Result<Issue, OutcomeError> {
        let name = name.into();
        if values.is_empty() {
            return Err(OutcomeError::empty_domain(name));
        }
        Ok(Issue::Categorical(CategoricalIssue {
            name,
            values: values.into_iter().map(Into::into).collect(),
        }))
    }

    /// Creates an integer-range issue over `min..=max`.
    pub fn contiguous(name: impl Into<String>, min: i64, max: i64) -> Result<Issue, OutcomeError> {
        let name = name.into();
        if min > max {
            return Err(OutcomeError::invalid_range(
                name,
                format!("lower bound {} is above upper bound {}", min, max),
            ));
        }
        Ok(Issue::Contiguous(ContiguousIssue { name, min, max }))
    }

    /// Creates a continuous issue over the real interval `[min, max]`.
    ///
    /// The interval must be finite and non-degenerate: a zero-width interval
    /// can neither be sampled uniformly nor discretized to distinct values.
    pub fn continuous(name: impl Into<String>, min: f64, max: f64) -> Result<Issue, OutcomeError> {
        let name = name.into();
        if !min.is_finite() || !max.is_finite() {
            return Err(OutcomeError::invalid_range(name, "bounds must be finite"));
        }
        if min >= max {
            return Err(OutcomeError::invalid_range(
                name,
                format!("lower bound {} is not below upper bound {}", min, max),
            ));
        }
        Ok(Issue::Continuous(ContinuousIssue { name, min, max }))
    }

    pub(crate) fn categorical_unchecked(name: String, values: Vec<Value>) -> Issue {
        debug_assert!(!values.is_empty());
        Issue::Categorical(CategoricalIssue { name, values })
    }

    pub(crate) fn contiguous_unchecked(name: String, min: i64, max: i64) -> Issue {
        debug_assert!(min <= max);
        Issue::Contiguous(ContiguousIssue { name, min, max })
    }

    /// The issue name.
    pub fn name(&self) -> &str {
        match self {
            Issue::Categorical(i) => &i.name,
            Issue::Contiguous(i) => &i.name,
            Issue::Continuous(i) => &i.name,
        }
    }

    /// The number of values in the domain.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Issue::Categorical(i) => Cardinality::Finite(i.values.len() as u128),
            Issue::Contiguous(i) => {
                Cardinality::Finite((i.max as i128 - i.min as i128 + 1) as u128)
            }
            Issue::Continuous(_) => Cardinality::Infinite,
        }
    }

    /// Returns true if the domain is finite.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, Issue::Continuous(_))
    }

    /// Returns true if the domain is a continuous interval.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Issue::Continuous(_))
    }

    /// Returns true if every value in the domain is a number.
    pub fn is_numeric(&self) -> bool {
        match self {
            Issue::Categorical(i) => i.values.iter().all(Value::is_numeric),
            Issue::Contiguous(_) | Issue::Continuous(_) => true,
        }
    }

    /// Returns true if every value in the domain is an integer.
    pub fn is_integer(&self) -> bool {
        match self {
            Issue::Categorical(i) => i.values.iter().all(|v| matches!(v, Value::Int(_))),
            Issue::Contiguous(_) => true,
            Issue::Continuous(_) => false,
        }
    }

    /// Returns true if every value in the domain is a real number.
    pub fn is_float(&self) -> bool {
        match self {
            Issue::Categorical(i) => i.values.iter().all(|v| matches!(v, Value::Real(_))),
            Issue::Contiguous(_) => false,
            Issue::Continuous(_) => true,
        }
    }

    /// The domain value at `index` in canonical order, or `None` for a
    /// continuous domain or an out-of-range index.
    pub fn value_at(&self, index: u128) -> Option<Value> {
        match self {
            Issue::Categorical(i) => i.values.get(index as usize).cloned(),
            Issue::Contiguous(i) => {
                let card = (i.max as i128 - i.min as i128 + 1) as u128;
                if index < card {
                    Some(Value::Int((i.min as i128 + index as i128) as i64))
                } else {
                    None
                }
            }
            Issue::Continuous(_) => None,
        }
    }

    /// Produces a discrete approximation of this issue with at most `n`
    /// values.
    ///
    /// A continuous domain becomes an evenly spaced grid: endpoint-anchored
    /// (including both bounds) when `endpoints` is set, cell midpoints
    /// otherwise; `grid` selects the endpoint-anchored placement and is only
    /// meaningful together with `endpoints`. Discrete domains keep their
    /// leading values: `compact` tightens a contiguous range to the smallest
    /// bounding sub-range `min..=min+n-1`. The result is stable across calls.
    pub fn to_discrete(
        &self,
        n: usize,
        compact: bool,
        grid: bool,
        endpoints: bool,
    ) -> Result<Issue, OutcomeError> {
        if n == 0 {
            return Err(OutcomeError::invalid_range(
                self.name(),
                "cannot discretize to zero values",
            ));
        }
        match self {
            Issue::Categorical(i) => {
                if n as u128 >= i.values.len() as u128 {
                    return Ok(self.clone());
                }
                Ok(Issue::Categorical(CategoricalIssue {
                    name: i.name.clone(),
                    values: i.values[..n].to_vec(),
                }))
            }
            Issue::Contiguous(i) => {
                let card = (i.max as i128 - i.min as i128 + 1) as u128;
                if n as u128 >= card {
                    return Ok(self.clone());
                }
                if compact {
                    return Ok(Issue::Contiguous(ContiguousIssue {
                        name: i.name.clone(),
                        min: i.min,
                        max: (i.min as i128 + n as i128 - 1) as i64,
                    }));
                }
                // Evenly spaced integers across the full range, both ends
                // included.
                let span = (i.max - i.min) as f64;
                let values = if n == 1 {
                    vec![Value::Int(i.min)]
                } else {
                    (0..n)
                        .map(|k| {
                            let v = i.min as f64 + span * k as f64 / (n - 1) as f64;
                            Value::Int(v.round() as i64)
                        })
                        .collect()
                };
                Ok(Issue::Categorical(CategoricalIssue {
                    name: i.name.clone(),
                    values,
                }))
            }
            Issue::Continuous(i) => {
                let values = if grid && endpoints && n >= 2 {
                    (0..n)
                        .map(|k| {
                            Value::Real(i.min + (i.max - i.min) * k as f64 / (n - 1) as f64)
                        })
                        .collect()
                } else {
                    // Cell midpoints of n equal subintervals.
                    (0..n)
                        .map(|k| {
                            Value::Real(i.min + (i.max - i.min) * (k as f64 + 0.5) / n as f64)
                        })
                        .collect()
                };
                Ok(Issue::Categorical(CategoricalIssue {
                    name: i.name.clone(),
                    values,
                }))
            }
        }
    }

    /// Draws one value uniformly from the domain.
    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        match self {
            Issue::Categorical(i) => i.values[rng.gen_range(0..i.values.len())].clone(),
            Issue::Contiguous(i) => Value::Int(rng.gen_range(i.min..=i.max)),
            Issue::Continuous(i) => Value::Real(rng.gen_range(i.min..i.max)),
        }
    }

    /// Draws `n` values uniformly.
    ///
    /// Without replacement, fails with an insufficiency error when the domain
    /// has fewer than `n` distinct values.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        with_replacement: bool,
    ) -> Result<Vec<Value>, OutcomeError> {
        if with_replacement {
            return Ok((0..n).map(|_| self.sample_one(rng)).collect());
        }
        match self.cardinality() {
            Cardinality::Finite(card) => {
                if card < n as u128 {
                    return Err(OutcomeError::InsufficientSamples {
                        requested: n,
                        available: card,
                    });
                }
                if card <= usize::MAX as u128 {
                    let picked = rand::seq::index::sample(rng, card as usize, n);
                    Ok(picked
                        .iter()
                        .filter_map(|k| self.value_at(k as u128))
                        .collect())
                } else {
                    // The range is too large to index directly; distinct
                    // draws are collected by rejection.
                    let mut seen: HashSet<u128> = HashSet::with_capacity(n);
                    let mut out = Vec::with_capacity(n);
                    while out.len() < n {
                        let k = rng.gen_range(0..card);
                        if seen.insert(k) {
                            if let Some(v) = self.value_at(k) {
                                out.push(v);
                            }
                        }
                    }
                    Ok(out)
                }
            }
            Cardinality::Infinite => {
                // Uniform real draws collide with probability zero; the
                // equality check is kept so the distinctness contract holds.
                let mut out: Vec<Value> = Vec::with_capacity(n);
                let mut attempts = 0usize;
                let max_attempts = n.saturating_mul(10).saturating_add(100);
                while out.len() < n && attempts < max_attempts {
                    attempts += 1;
                    let v = self.sample_one(rng);
                    if !out.contains(&v) {
                        out.push(v);
                    }
                }
                if out.len() < n {
                    return Err(OutcomeError::InsufficientSamples {
                        requested: n,
                        available: out.len() as u128,
                    });
                }
                Ok(out)
            }
        }
    }

    /// Returns true if `value` belongs to the domain.
    ///
    /// Membership is numeric for range issues (an integral `Real` is inside
    /// an integer range); strict typing is checked separately by
    /// [`Issue::type_matches`].
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Issue::Categorical(i) => i.values.iter().any(|v| v == value),
            Issue::Contiguous(i) => match value {
                Value::Int(v) => *v >= i.min && *v <= i.max,
                Value::Real(r) => {
                    r.fract() == 0.0 && *r >= i.min as f64 && *r <= i.max as f64
                }
                _ => false,
            },
            Issue::Continuous(i) => match value.as_real() {
                Some(r) => r >= i.min && r <= i.max,
                None => false,
            },
        }
    }

    /// Returns true if `value` has the type this issue expects.
    pub fn type_matches(&self, value: &Value) -> bool {
        match self {
            Issue::Categorical(i) => i
                .values
                .iter()
                .any(|v| std::mem::discriminant(v) == std::mem::discriminant(value)),
            Issue::Contiguous(_) => matches!(value, Value::Int(_)),
            Issue::Continuous(_) => matches!(value, Value::Real(_)),
        }
    }

    /// Coerces `value` to the type this issue expects, or fails with a type
    /// error.
    pub fn coerce(&self, value: &Value) -> Result<Value, OutcomeError> {
        match self {
            Issue::Categorical(i) => {
                if i.values.iter().any(|v| v == value) {
                    return Ok(value.clone());
                }
                // Bridge Int/Real representations of the same number.
                if let Some(r) = value.as_real() {
                    if let Some(v) = i
                        .values
                        .iter()
                        .find(|v| v.is_numeric() && v.as_real() == Some(r))
                    {
                        return Ok(v.clone());
                    }
                }
                Err(OutcomeError::type_mismatch(
                    &i.name,
                    value,
                    "not a member of the categorical domain",
                ))
            }
            Issue::Contiguous(i) => match value {
                Value::Int(v) => Ok(Value::Int(*v)),
                Value::Real(r) if r.fract() == 0.0 => Ok(Value::Int(*r as i64)),
                Value::Text(s) => s.parse::<i64>().map(Value::Int).map_err(|_| {
                    OutcomeError::type_mismatch(&i.name, value, "expected an integer")
                }),
                _ => Err(OutcomeError::type_mismatch(
                    &i.name,
                    value,
                    "expected an integer",
                )),
            },
            Issue::Continuous(i) => match value {
                Value::Real(r) => Ok(Value::Real(*r)),
                Value::Int(v) => Ok(Value::Real(*v as f64)),
                Value::Text(s) => s.parse::<f64>().map(Value::Real).map_err(|_| {
                    OutcomeError::type_mismatch(&i.name, value, "expected a real number")
                }),
                _ => Err(OutcomeError::type_mismatch(
                    &i.name,
                    value,
                    "expected a real number",
                )),
            },
        }
    }
}
