//! Feature-term error types

use thiserror::Error;

/// Errors that can occur while building, parsing or expanding feature terms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TermError {
    /// Syntax errors in a rendered term
    #[error("Syntax error at position {position} in '{input}': {message}")]
    Syntax {
        input: String,
        position: usize,
        message: String,
    },

    /// Exponent that is not a positive integer
    #[error("Invalid exponent '{exponent}' for variable '{variable}'")]
    InvalidExponent { variable: String, exponent: String },

    /// Variable name that is empty or collides with the grammar
    #[error("Invalid variable name '{name}': {reason}")]
    InvalidVariable { name: String, reason: &'static str },

    /// Same variable listed twice in an expansion
    #[error("Variable '{0}' appears more than once")]
    DuplicateVariable(String),

    /// Term without any factor
    #[error("A feature term needs at least one factor")]
    EmptyTerm,

    /// Expansion requested without variables
    #[error("Cannot expand features without any input variables")]
    NoVariables,

    /// Degree outside the supported range
    #[error("Degree must be at least 1, got {0}")]
    InvalidDegree(usize),

    /// Row or matrix width does not match the expansion
    #[error("Dimension mismatch: expected {expected} base values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type alias for term operations
pub type TermResult<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Create a syntax error
    pub fn syntax(input: &str, position: usize, message: impl Into<String>) -> Self {
        TermError::Syntax {
            input: input.to_string(),
            position,
            message: message.into(),
        }
    }
}
