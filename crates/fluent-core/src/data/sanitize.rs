//! Column selection, numeric coercion and row filtering

use serde::Serialize;
use tracing::debug;

use super::*;
use crate::terms::{INTERACTION_SEPARATOR, POWER_SEPARATOR};

/// Minimum number of complete rows needed to fit anything
const MIN_ROWS: usize = 2;

/// What the sanitizer threw away
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizationReport {
    /// Requested input columns without a single numeric value
    pub ignored_x_columns: Vec<String>,
    /// Rows removed because a kept input or a target was missing
    pub dropped_rows: usize,
}

/// Numeric input and target matrices with matching rows
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedData {
    /// Kept input columns (rows × inputs)
    pub inputs: Matrix,
    /// Target columns (rows × targets)
    pub targets: Matrix,
    /// Names of the kept input columns, in request order
    pub input_names: Vec<String>,
    /// Names of the target columns, in request order
    pub target_names: Vec<String>,
    /// Ignored columns and dropped rows
    pub report: SanitizationReport,
}

impl SanitizedData {
    /// Number of complete rows
    pub fn nrows(&self) -> usize {
        self.inputs.nrows()
    }
}

/// Turns a column selection of a raw table into numeric matrices
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    table: &'a Table,
}

impl<'a> Sanitizer<'a> {
    /// Create a sanitizer over a table
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    /// Coerce the selected columns to numbers and keep the complete rows
    pub fn sanitize<S: AsRef<str>>(&self, inputs: &[S], targets: &[S]) -> Result<SanitizedData> {
        if inputs.is_empty() {
            return Err(DataError::NoColumnsSelected { role: "X" });
        }
        if targets.is_empty() {
            return Err(DataError::NoColumnsSelected { role: "Y" });
        }

        let input_names: Vec<&str> = inputs.iter().map(AsRef::as_ref).collect();
        let target_names: Vec<&str> = targets.iter().map(AsRef::as_ref).collect();

        let input_columns = self.coerce_columns(&input_names)?;
        let target_columns = self.coerce_columns(&target_names)?;

        for (i, name) in input_names.iter().enumerate() {
            validate_variable_name(name)?;
            if input_names[..i].iter().any(|other| other.trim() == name.trim()) {
                return Err(DataError::DuplicateColumn(name.trim().to_string()));
            }
        }

        let mut kept = Vec::new();
        let mut ignored = Vec::new();
        for (name, column) in input_names.iter().zip(input_columns) {
            if column.iter().any(Option::is_some) {
                kept.push((name.trim().to_string(), column));
            } else {
                debug!(column = %name, "ignoring input column without numeric values");
                ignored.push(name.to_string());
            }
        }

        if kept.is_empty() {
            return Err(DataError::NoValidInputs { ignored });
        }

        for (name, column) in target_names.iter().zip(&target_columns) {
            if column.iter().all(Option::is_none) {
                return Err(DataError::NoNumericValues(name.to_string()));
            }
        }

        let complete_rows: Vec<usize> = (0..self.table.nrows())
            .filter(|&row| {
                kept.iter().all(|(_, column)| column[row].is_some())
                    && target_columns.iter().all(|column| column[row].is_some())
            })
            .collect();

        let dropped_rows = self.table.nrows() - complete_rows.len();
        if complete_rows.len() < MIN_ROWS {
            return Err(DataError::InsufficientRows {
                rows: complete_rows.len(),
                required: MIN_ROWS,
            });
        }

        let kept_columns: Vec<&[Option<f64>]> =
            kept.iter().map(|(_, column)| column.as_slice()).collect();
        let target_refs: Vec<&[Option<f64>]> =
            target_columns.iter().map(Vec::as_slice).collect();

        let inputs = gather(&kept_columns, &complete_rows);
        let targets = gather(&target_refs, &complete_rows);

        debug!(
            rows = complete_rows.len(),
            dropped_rows,
            ignored = ignored.len(),
            "sanitized table"
        );

        Ok(SanitizedData {
            inputs,
            targets,
            input_names: kept.into_iter().map(|(name, _)| name).collect(),
            target_names: target_names.iter().map(|s| s.trim().to_string()).collect(),
            report: SanitizationReport {
                ignored_x_columns: ignored,
                dropped_rows,
            },
        })
    }

    fn coerce_columns(&self, names: &[&str]) -> Result<Vec<Vec<Option<f64>>>> {
        names
            .iter()
            .map(|name| {
                self.table
                    .get_column(name)
                    .map(|cells| cells.iter().map(Cell::to_f64).collect())
                    .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
            })
            .collect()
    }
}

/// Reject column names that would collide with the feature-term grammar
///
/// Surrounding whitespace is allowed; the sanitizer names variables by the
/// trimmed header.
pub fn validate_variable_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DataError::EmptyColumnName);
    }
    if let Some(character) = name
        .chars()
        .find(|&c| c == INTERACTION_SEPARATOR || c == POWER_SEPARATOR)
    {
        return Err(DataError::ReservedCharacter {
            column: name.to_string(),
            character,
        });
    }
    Ok(())
}

/// Stack the given rows of optional columns into a dense matrix.
///
/// Every `rows` entry must be `Some` in every column.
fn gather(columns: &[&[Option<f64>]], rows: &[usize]) -> Matrix {
    Matrix::from_shape_fn((rows.len(), columns.len()), |(i, j)| {
        columns[j][rows[i]].unwrap_or(f64::NAN)
    })
}
