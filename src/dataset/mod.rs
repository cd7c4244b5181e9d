//! Column-oriented tabular data.
//!
//! A [`Frame`] is an ordered set of named, equally long [`Column`]s. Every
//! pipeline stage takes a frame by reference and returns a new one, so an
//! input frame is never mutated in place.
//!
//! # Example
//!
//! ```rust
//! use churnprep::dataset::{Column, Frame};
//!
//! let frame = Frame::new(vec![
//!     ("Age".to_string(), Column::Numeric(vec![Some(30.0), Some(45.0)])),
//!     ("Contract".to_string(), Column::Text(vec![Some("One year".into()), None])),
//! ])
//! .unwrap();
//!
//! assert_eq!(frame.n_rows(), 2);
//! assert_eq!(frame.null_counts(), vec![("Age".to_string(), 0), ("Contract".to_string(), 1)]);
//! ```

use crate::error::{PipelineError, Result};
use std::collections::HashSet;

pub mod loader;
pub mod writer;

pub use self::loader::{load_frame, LoadOptions};
pub use self::writer::write_frame;

/// Cell values treated as missing when reading delimited text.
pub const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Storage kind of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// A single column of nullable cells.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Floating point cells; `None` is a null.
    Numeric(Vec<Option<f64>>),
    /// String cells; `None` is a null.
    Text(Vec<Option<String>>),
}

/// Hashable view of one cell, used for exact-duplicate detection.
///
/// Nulls compare equal to nulls, and `-0.0` equals `0.0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKey {
    Null,
    Number(u64),
    Text(String),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Text(_) => ColumnKind::Text,
        }
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Column::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Borrow the numeric cells, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Borrow the text cells, if this is a text column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Textual rendering of a cell as written to delimited output.
    ///
    /// Nulls render as an empty string.
    pub fn cell_to_string(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            Column::Text(v) => v[row].clone().unwrap_or_default(),
        }
    }

    /// Hashable key for the cell at `row`.
    pub fn cell_key(&self, row: usize) -> CellKey {
        match self {
            Column::Numeric(v) => match v[row] {
                // Fold -0.0 into 0.0 so both hash alike.
                Some(x) => CellKey::Number((x + 0.0).to_bits()),
                None => CellKey::Null,
            },
            Column::Text(v) => match &v[row] {
                Some(s) => CellKey::Text(s.clone()),
                None => CellKey::Null,
            },
        }
    }

    /// Build a new column from the given row indices, in that order.
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

/// An ordered table of named columns sharing one row count.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame from `(name, column)` pairs.
    ///
    /// # Errors
    /// Returns [`PipelineError::Format`] if names repeat or column lengths differ.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for (name, column) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::Format(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
            if column.len() != n_rows {
                return Err(PipelineError::Format(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    n_rows
                )));
            }
        }

        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.columns[idx])
    }

    /// Iterate over `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// Borrow a required numeric column.
    ///
    /// # Errors
    /// - [`PipelineError::Schema`] if the column is absent
    /// - [`PipelineError::Type`] if the column is not numeric
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        let column = self.column(name).ok_or_else(|| PipelineError::Schema {
            missing: vec![name.to_string()],
        })?;
        column.as_numeric().ok_or_else(|| PipelineError::Type {
            column: name.to_string(),
            expected: "numeric",
        })
    }

    /// Per-column null counts, in column order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.iter()
            .map(|(name, column)| (name.to_string(), column.null_count()))
            .collect()
    }

    /// Return a new frame where `name` is replaced by `column`.
    ///
    /// # Errors
    /// Returns [`PipelineError::Schema`] if the column is absent or
    /// [`PipelineError::Format`] if the new column has a different length.
    pub fn with_column(&self, name: &str, column: Column) -> Result<Frame> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| PipelineError::Schema {
                missing: vec![name.to_string()],
            })?;
        if column.len() != self.n_rows {
            return Err(PipelineError::Format(format!(
                "replacement for '{}' has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows
            )));
        }

        let mut columns = self.columns.clone();
        columns[idx] = column;
        Ok(Frame {
            names: self.names.clone(),
            columns,
            n_rows: self.n_rows,
        })
    }

    /// Return a new frame holding only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Frame {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            n_rows: rows.len(),
        }
    }

    /// Return a new frame keeping rows for which `keep(row)` is true.
    ///
    /// Relative row order is preserved.
    pub fn filter_rows<F>(&self, keep: F) -> Frame
    where
        F: Fn(usize) -> bool,
    {
        let rows: Vec<usize> = (0..self.n_rows).filter(|&r| keep(r)).collect();
        self.take_rows(&rows)
    }

    /// Return a new frame without the named columns; absent names are ignored.
    pub fn drop_columns(&self, drop: &[&str]) -> Frame {
        let (names, columns) = self
            .iter()
            .filter(|(name, _)| !drop.contains(name))
            .map(|(name, column)| (name.to_string(), column.clone()))
            .unzip();
        Frame {
            names,
            columns,
            n_rows: self.n_rows,
        }
    }

    /// Hashable key of a whole row.
    pub fn row_key(&self, row: usize) -> Vec<CellKey> {
        self.columns.iter().map(|c| c.cell_key(row)).collect()
    }
}
