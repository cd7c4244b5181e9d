//! Delimited-file loading with per-column type inference.

use super::{Column, Frame, NULL_TOKENS};
use crate::error::{PipelineError, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, info};

/// Options controlling how a delimited file is read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw.trim())
}

/// Load a delimited file with a header row into a [`Frame`].
///
/// A column becomes [`Column::Numeric`] when every non-null cell parses as a
/// float; otherwise it is kept as [`Column::Text`]. Null tokens are listed in
/// [`NULL_TOKENS`].
///
/// # Errors
/// - [`PipelineError::NotFound`] if the file does not exist
/// - [`PipelineError::Format`] if the header is missing or invalid, rows are
///   ragged, or the content is not valid UTF-8
pub fn load_frame<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Frame> {
    let path = path.as_ref();
    info!("Loading data from {}", path.display());

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::Format(format!(
            "{} has no header row",
            path.display()
        )));
    }
    if let Some(pos) = headers.iter().position(|h| h.trim().is_empty()) {
        return Err(PipelineError::Format(format!(
            "empty column name at position {}",
            pos
        )));
    }

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(if is_null_token(field) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| {
            let column = infer_column(cells);
            debug!(column = %name, kind = ?column.kind(), "inferred column kind");
            (name, column)
        })
        .collect();
    let frame = Frame::new(columns)?;

    info!(
        "Loaded {} rows and {} columns",
        frame.n_rows(),
        frame.n_columns()
    );
    Ok(frame)
}

/// Decide the kind of a column from its raw cells.
///
/// Spellings that parse to a non-finite float (`NAN`, `-nan`, `inf`, ...)
/// count as numeric cells but are stored as nulls.
fn infer_column(cells: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .map(|v| v.is_finite().then_some(v)),
        })
        .collect();

    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Text(cells),
    }
}
