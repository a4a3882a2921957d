//! Error types for the analysis engine.

use thiserror::Error;

use crate::outcomes::OutcomeError;

/// Errors that can occur while analyzing preferences over an outcome space.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("Either outcomes or issues must be provided")]
    MissingCandidates,

    #[error("Maximum utility for party {index} is too close to zero")]
    ZeroMaxUtility { index: usize },

    #[error("{ufuns} utility functions cannot be paired with {max_utils} maximum utilities")]
    LengthMismatch { ufuns: usize, max_utils: usize },

    #[error("No outcome pair produced a usable utility comparison")]
    NoComparablePairs,

    #[error("No outcome clears the infeasibility cutoff")]
    NoFeasibleOutcomes,

    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_displays_correctly() {
        let err = AnalysisError::LengthMismatch {
            ufuns: 3,
            max_utils: 2,
        };
        assert_eq!(
            format!("{}", err),
            "3 utility functions cannot be paired with 2 maximum utilities"
        );
    }

    #[test]
    fn outcome_errors_pass_through_transparently() {
        let err: AnalysisError = OutcomeError::InfiniteEnumeration.into();
        assert_eq!(
            format!("{}", err),
            "Cannot enumerate a space with continuous issues; discretize it first"
        );
    }
}
