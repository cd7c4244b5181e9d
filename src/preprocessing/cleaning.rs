//! Cleaning: median fill, duplicate removal and range filters.
//!
//! Each step consumes the output of the previous one:
//! 1. fill TotalCharges nulls with the column median
//! 2. drop exact-duplicate rows (first occurrence wins)
//! 3. drop rows with Age outside `[MIN_AGE, MAX_AGE]`
//! 4. drop rows with negative Tenure
//!
//! Rows with a null Age or Tenure fail the range comparisons and are dropped.

use crate::dataset::{Column, Frame};
use crate::error::Result;
use crate::schema::{AGE, MAX_AGE, MIN_AGE, TENURE, TOTAL_CHARGES};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// What a cleaning run changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Median used to fill TotalCharges, if any fill happened.
    pub fill_value: Option<f64>,
    pub filled: usize,
    pub duplicates_removed: usize,
    pub age_out_of_range_removed: usize,
    pub negative_tenure_removed: usize,
    pub rows_remaining: usize,
}

/// Median of the finite values, or `None` if there are none.
///
/// Nulls, NaN and infinities are skipped. An even count averages the two
/// middle values.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    Some(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

/// Fill nulls in a numeric column with its median.
///
/// Returns the new frame, the fill value and how many cells were filled.
pub fn fill_median(frame: &Frame, column: &str) -> Result<(Frame, Option<f64>, usize)> {
    let values = frame.numeric(column)?;
    // NaN and infinities are filled like nulls.
    let is_missing = |v: &Option<f64>| !v.is_some_and(f64::is_finite);
    let nulls = values.iter().filter(|v| is_missing(v)).count();
    if nulls == 0 {
        return Ok((frame.clone(), None, 0));
    }

    let Some(fill) = median(values) else {
        debug!(column, "column is entirely null, nothing to fill");
        return Ok((frame.clone(), None, 0));
    };

    let filled = values
        .iter()
        .map(|v| if is_missing(v) { Some(fill) } else { *v })
        .collect();
    let frame = frame.with_column(column, Column::Numeric(filled))?;
    Ok((frame, Some(fill), nulls))
}

/// Drop exact-duplicate rows across all columns, keeping the first occurrence.
pub fn drop_duplicates(frame: &Frame) -> Frame {
    let mut seen = HashSet::with_capacity(frame.n_rows());
    let keep: Vec<usize> = (0..frame.n_rows())
        .filter(|&row| seen.insert(frame.row_key(row)))
        .collect();
    frame.take_rows(&keep)
}

/// Keep rows whose value in `column` satisfies `predicate`; nulls are dropped.
fn retain_where<F>(frame: &Frame, column: &str, predicate: F) -> Result<Frame>
where
    F: Fn(f64) -> bool,
{
    let values = frame.numeric(column)?;
    Ok(frame.filter_rows(|row| values[row].is_some_and(&predicate)))
}

/// Clean `frame`, returning the new frame and a report of what changed.
///
/// Cleaning is idempotent: cleaning the output again changes nothing.
pub fn clean_with_report(frame: &Frame) -> Result<(Frame, CleaningReport)> {
    info!("Cleaning data...");
    let mut report = CleaningReport::default();

    let (df, fill_value, filled) = fill_median(frame, TOTAL_CHARGES)?;
    report.fill_value = fill_value;
    report.filled = filled;
    if let Some(value) = fill_value {
        debug!(column = TOTAL_CHARGES, value, filled, "filled nulls with median");
    }

    let before = df.n_rows();
    let df = drop_duplicates(&df);
    report.duplicates_removed = before - df.n_rows();
    if report.duplicates_removed > 0 {
        info!("Removed {} duplicate rows", report.duplicates_removed);
    }

    let before = df.n_rows();
    let df = retain_where(&df, AGE, |age| (MIN_AGE..=MAX_AGE).contains(&age))?;
    report.age_out_of_range_removed = before - df.n_rows();

    let before = df.n_rows();
    let df = retain_where(&df, TENURE, |tenure| tenure >= 0.0)?;
    report.negative_tenure_removed = before - df.n_rows();

    report.rows_remaining = df.n_rows();
    info!("Cleaned data: {} rows remaining", df.n_rows());
    Ok((df, report))
}

/// Clean `frame`. See [`clean_with_report`].
pub fn clean(frame: &Frame) -> Result<Frame> {
    clean_with_report(frame).map(|(df, _)| df)
}
