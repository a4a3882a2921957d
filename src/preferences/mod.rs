//! Preference analysis: utility functions and the multi-criteria engine.
//!
//! # Module Organization
//!
//! - `ufun` - The utility-function capability consumed by the engine
//! - `linear` - Weighted-sum utility over numeric outcomes
//! - `mapping` - Table- and closure-backed utilities
//! - `ops` - Pareto frontier, Nash point, normalization, difficulty indices
//! - `discounted` - Time-discounted utility composition
//! - `errors` - Error types for the layer
//!
//! Every function here is pure over immutable inputs; randomness enters only
//! through caller-provided generators, and brute-force paths are bounded by
//! caller-supplied caps.

mod discounted;
mod errors;
mod linear;
mod mapping;
pub mod ops;
mod ufun;

pub use discounted::{
    make_discounted_ufun, DiscountParams, ExpDiscountedUfun, LinDiscountedUfun, SessionClock,
    TimeFactor,
};
pub use errors::AnalysisError;
pub use linear::LinearUtilityFunction;
pub use mapping::MappingUtilityFunction;
pub use ops::{
    conflict_level, extreme_outcomes, nash_point, normalize, opposition_level, pareto_frontier,
    sample_outcome_with_utility, utility_range, winwin_level,
};
pub use ufun::{UtilityFunction, DEFAULT_MAX_CARDINALITY};
