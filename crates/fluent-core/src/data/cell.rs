//! Raw table cells and numeric coercion

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder tokens that always mean "no value".
///
/// Matching is exact and case-sensitive: `"n/a"` is not a placeholder and
/// only becomes missing because it fails to parse as a number.
pub const MISSING_TOKENS: [&str; 10] = [
    "-", "\u{2014}", "\u{2013}", "N/A", "NA", "na", "NaN", "", "null", "None",
];

/// A single value as it arrived from a file reader or a form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value
    Number(f64),
    /// Free text, possibly holding a number
    Text(String),
    /// No value at all
    #[default]
    Empty,
}

impl Cell {
    /// Coerce the cell to a finite number, or `None` when it is missing
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Number(_) | Cell::Empty => None,
            Cell::Text(raw) => coerce_text(raw),
        }
    }

    /// Whether the cell is missing after coercion
    pub fn is_missing(&self) -> bool {
        self.to_f64().is_none()
    }
}

fn coerce_text(raw: &str) -> Option<f64> {
    if MISSING_TOKENS.contains(&raw) {
        return None;
    }

    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Empty => Ok(()),
        }
    }
}
