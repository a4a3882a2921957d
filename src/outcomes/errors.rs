//! Error types for the outcome-space layer.

use thiserror::Error;

/// Errors that can occur while building, transforming, or sampling outcome
/// spaces and issues.
#[derive(Debug, Clone, Error)]
pub enum OutcomeError {
    #[error("Issue '{name}' has an empty value domain")]
    EmptyDomain { name: String },

    #[error("Issue '{name}' has an invalid range: {reason}")]
    InvalidRange { name: String, reason: String },

    #[error("Transform requires at least {required} outcomes, more than the allowed {max_cardinality}")]
    CapacityExceeded { required: u128, max_cardinality: u128 },

    #[error("Requested {requested} distinct samples but only {available} are available")]
    InsufficientSamples { requested: usize, available: u128 },

    #[error("Cannot enumerate a space with continuous issues; discretize it first")]
    InfiniteEnumeration,

    #[error("Cannot build an outcome space from an empty outcome list")]
    EmptyOutcomeSet,

    #[error("Outcome has {actual} values but the space defines {expected} issues")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Value '{value}' cannot be used for issue '{issue}': {reason}")]
    TypeMismatch {
        issue: String,
        value: String,
        reason: String,
    },
}

impl OutcomeError {
    /// Creates an empty-domain error for the named issue.
    pub fn empty_domain(name: impl Into<String>) -> Self {
        OutcomeError::EmptyDomain { name: name.into() }
    }

    /// Creates an invalid-range error for the named issue.
    pub fn invalid_range(name: impl Into<String>, reason: impl Into<String>) -> Self {
        OutcomeError::InvalidRange {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a type-mismatch error for a value rejected by an issue.
    pub fn type_mismatch(
        issue: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        OutcomeError::TypeMismatch {
            issue: issue.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
