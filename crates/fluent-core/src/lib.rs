//! Fluent core
//!
//! Data handling shared by the Fluent regression crates: the raw table an
//! upload produces, the sanitizer that turns selected columns into numeric
//! matrices, and the structured polynomial feature terms that label every
//! fitted coefficient.

pub mod data;
pub mod terms;

pub use data::{Cell, DataError, SanitizedData, Sanitizer, Table};
pub use terms::{FeatureExpander, FeatureTerm, TermError};
