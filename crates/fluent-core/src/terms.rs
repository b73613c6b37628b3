//! Polynomial feature terms
//!
//! A feature term is a monomial over the base input variables, such as
//! `x`, `x^2` or `a*b^2`. Terms are structured values from the moment they
//! are created; their string form is a rendering that the parser in this
//! module reads back into the identical structure.
//!
//! Grammar of the rendered form:
//!
//! ```text
//! term     := factor ( '*' factor )*
//! factor   := variable ( '^' exponent )?
//! exponent := [0-9]+          (>= 1)
//! variable := any text without '*' or '^', trimmed
//! ```

pub use crate::terms::error::{TermError, TermResult};

pub mod error;
mod expander;
mod parser;
mod term;

#[cfg(test)]
mod tests;

pub use expander::FeatureExpander;
pub use parser::TermParser;
pub use term::{Factor, FeatureTerm};

/// Joins the factors of an interaction term
pub const INTERACTION_SEPARATOR: char = '*';

/// Separates a variable from its exponent
pub const POWER_SEPARATOR: char = '^';
