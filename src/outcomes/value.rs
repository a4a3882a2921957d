//! Outcome values - the payload carried at each issue position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One component of an outcome tuple.
///
/// `Tuple` holds a full outcome folded into a single position; it is produced
/// when a multi-issue space is collapsed to a single synthetic issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
    Tuple(Vec<Value>),
}

impl Value {
    /// Returns true if this value is an integer or a real number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_))
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a real number, widening integers.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Tuple(vs) => {
                write!(f, "(")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One candidate complete agreement: one value per issue, in declared issue
/// order. Produced by enumeration or sampling, consumed by utility evaluation.
pub type Outcome = Vec<Value>;

/// Builds the single-value outcomes `[(0,), (1,), ..., (n-1,)]`.
///
/// A shorthand for index-based candidate sets used by the difficulty indices
/// and their tests.
pub fn integer_outcomes(n: usize) -> Vec<Outcome> {
    (0..n).map(|i| vec![Value::Int(i as i64)]).collect()
}
