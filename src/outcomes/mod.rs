//! Decision-space modeling: issues, outcomes, and outcome spaces.
//!
//! # Module Organization
//!
//! - `value` - Outcome values and the outcome tuple type
//! - `cardinality` - Finite-or-infinite outcome counts
//! - `issue` - Single negotiable dimensions (categorical, integer range, real
//!   interval)
//! - `space` - The Cartesian product of issues and its shared capability
//! - `discrete` - Finite spaces with exact enumeration and cardinality
//!   limiting
//! - `ops` - Candidate-set builders (enumeration and discretization)
//! - `interop` - Attribute-mapping serialization and the XML collaborator
//!   seam
//! - `errors` - Error types for the layer
//!
//! All operations are synchronous and pure; transforms never mutate a built
//! space.

mod cardinality;
mod discrete;
mod errors;
mod interop;
mod issue;
pub mod ops;
mod space;
mod value;

pub use cardinality::Cardinality;
pub use discrete::{DiscreteOutcomeSpace, FiniteSpace, OutcomeIter};
pub use errors::OutcomeError;
pub use interop::{IssueXmlCodec, CARTESIAN_SPACE_TYPE, DISCRETE_SPACE_TYPE};
pub use issue::{CategoricalIssue, ContiguousIssue, ContinuousIssue, Issue};
pub use space::{CartesianOutcomeSpace, CartesianSpace, DEFAULT_DISCRETE_LEVELS};
pub use value::{integer_outcomes, Outcome, Value};
