//! Tabular input and sanitization
//!
//! This module holds the raw, loosely typed table that an upload or a
//! manual entry produces, and the sanitizer that turns a selection of its
//! columns into the numeric matrices the fitting code consumes.

mod cell;
mod sanitize;
mod table;


// Re-exports
pub use cell::{Cell, MISSING_TOKENS};
pub use sanitize::{validate_variable_name, SanitizationReport, SanitizedData, Sanitizer};
pub use table::{Table, TableBuilder};

// Type aliases for common use cases
pub type Matrix = ndarray::Array2<f64>;
pub type Vector = ndarray::Array1<f64>;

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Column '{0}' not found in data")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Column name '{column}' contains reserved character '{character}'")]
    ReservedCharacter { column: String, character: char },

    #[error("Column name must not be empty")]
    EmptyColumnName,

    #[error("Please select at least one {role} column")]
    NoColumnsSelected { role: &'static str },

    #[error("No valid numeric input columns after sanitization (ignored: {ignored:?})")]
    NoValidInputs { ignored: Vec<String> },

    #[error("Target column '{0}' has no valid numeric values after sanitization")]
    NoNumericValues(String),

    #[error("Not enough valid rows after sanitization: {rows} remaining, {required} required")]
    InsufficientRows { rows: usize, required: usize },
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
