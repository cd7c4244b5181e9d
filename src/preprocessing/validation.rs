//! Schema and type gate run before any transformation.

use crate::dataset::{ColumnKind, Frame};
use crate::error::{PipelineError, Result};
use crate::schema::{NUMERIC_TYPED_COLUMNS, REQUIRED_COLUMNS};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of a successful validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub n_rows: usize,
    pub n_columns: usize,
    /// Null count of every column that has at least one null.
    pub null_counts: Vec<(String, usize)>,
}

impl ValidationReport {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|(_, n)| n).sum()
    }
}

/// Validate `frame` against the required schema.
///
/// Checks, in order:
/// 1. every required column is present
/// 2. null counts per column (reported, never fatal)
/// 3. Age, Tenure and Churn are numeric
///
/// The frame is never modified.
///
/// # Errors
/// - [`PipelineError::Schema`] naming exactly the missing columns
/// - [`PipelineError::Type`] for the first non-numeric typed column
pub fn validate(frame: &Frame) -> Result<ValidationReport> {
    info!("Validating data...");

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !frame.contains(name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema { missing });
    }

    let null_counts: Vec<(String, usize)> = frame
        .null_counts()
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
    for (column, count) in &null_counts {
        warn!(column = %column, nulls = count, "found null values");
    }

    for name in NUMERIC_TYPED_COLUMNS {
        let kind = frame.column(name).map(|c| c.kind());
        if kind != Some(ColumnKind::Numeric) {
            return Err(PipelineError::Type {
                column: name.to_string(),
                expected: "numeric",
            });
        }
    }

    info!("Data validation passed");
    Ok(ValidationReport {
        n_rows: frame.n_rows(),
        n_columns: frame.n_columns(),
        null_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn frame_with(columns: &[&str]) -> Frame {
        Frame::new(
            columns
                .iter()
                .map(|name| (name.to_string(), Column::Numeric(vec![Some(1.0)])))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_reports_exact_missing_columns() {
        let frame = frame_with(&["Age", "Contract", "Churn", "CustomerID"]);
        match validate(&frame) {
            Err(PipelineError::Schema { missing }) => assert_eq!(
                missing,
                vec!["Tenure", "MonthlyCharges", "TotalCharges", "PaymentMethod"]
            ),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_passes_and_counts_nulls() {
        let mut frame = frame_with(&REQUIRED_COLUMNS);
        frame = frame
            .with_column("TotalCharges", Column::Numeric(vec![None]))
            .unwrap();
        let report = validate(&frame).unwrap();
        assert_eq!(report.null_counts, vec![("TotalCharges".to_string(), 1)]);
        assert_eq!(report.total_nulls(), 1);
        assert_eq!(report.n_rows, 1);
    }

    #[test]
    fn test_validate_rejects_text_tenure() {
        let frame = frame_with(&REQUIRED_COLUMNS)
            .with_column("Tenure", Column::Text(vec![Some("ten".into())]))
            .unwrap();
        assert!(matches!(
            validate(&frame),
            Err(PipelineError::Type { column, .. }) if column == "Tenure"
        ));
    }

    #[test]
    fn test_validate_allows_text_categoricals() {
        let frame = frame_with(&REQUIRED_COLUMNS)
            .with_column("Contract", Column::Text(vec![Some("One year".into())]))
            .unwrap();
        assert!(validate(&frame).is_ok());
    }
}
