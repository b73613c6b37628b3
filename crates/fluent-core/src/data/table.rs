//! Order-preserving table of raw cells

use indexmap::IndexMap;

use super::*;

/// A rectangular table of raw cells, keyed by column name
///
/// Column order is insertion order, which is also the order the
/// sanitizer reports columns in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub(crate) columns: IndexMap<String, Vec<Cell>>,
    pub(crate) nrows: usize,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from named columns
    pub fn from_columns<I, S, C>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<C>)>,
        S: Into<String>,
        C: Into<Cell>,
    {
        let mut builder = TableBuilder::new();

        for (name, cells) in columns {
            builder = builder.with_column(name, cells)?;
        }

        Ok(builder.build())
    }

    /// Create a table from a header and row-major records, as a CSV reader yields them
    pub fn from_rows<H, S, R, C>(header: H, rows: R) -> Result<Self>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Vec<C>>,
        C: Into<Cell>,
    {
        let names: Vec<String> = header.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(DataError::DimensionMismatch {
                    expected: format!("{} cells in row {}", names.len(), row_idx),
                    actual: format!("{} cells", row.len()),
                });
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell.into());
            }
        }

        Self::from_columns(names.into_iter().zip(columns))
    }

    /// Get the shape of the table (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    /// Get the number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Get a reference to a column
    pub fn get_column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }
}

/// Builder for creating tables
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: IndexMap<String, Vec<Cell>>,
    nrows: Option<usize>,
}

impl TableBuilder {
    /// Create a new TableBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the table
    pub fn with_column<S, C>(mut self, name: S, cells: Vec<C>) -> Result<Self>
    where
        S: Into<String>,
        C: Into<Cell>,
    {
        let name = name.into();

        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }

        match self.nrows {
            Some(n) if cells.len() != n => {
                return Err(DataError::DimensionMismatch {
                    expected: format!("{} rows", n),
                    actual: format!("{} rows", cells.len()),
                });
            }
            None => {
                self.nrows = Some(cells.len());
            }
            _ => {}
        }

        self.columns
            .insert(name, cells.into_iter().map(Into::into).collect());
        Ok(self)
    }

    /// Build the table
    pub fn build(self) -> Table {
        Table {
            columns: self.columns,
            nrows: self.nrows.unwrap_or(0),
        }
    }
}
