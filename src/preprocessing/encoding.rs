//! Category encoding for text columns.
//!
//! Maps each distinct category of a column to an integer code. Codes are the
//! positions of the categories in ascending (byte-wise) sorted order, so
//! `["Month-to-month", "One year", "Two year"]` become `0, 1, 2`.

use crate::dataset::{Column, Frame};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::schema::CATEGORICAL_COLUMNS;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// Category encoder (unfitted).
///
/// # Example
/// ```ignore
/// use churnprep::preprocessing::{CategoryEncoder, Transformer, FittedTransformer};
///
/// let encoder = CategoryEncoder::default(); // Contract, PaymentMethod
/// let fitted = encoder.fit(&frame)?;
/// let encoded = fitted.transform(&frame)?;
/// ```
#[derive(Clone, Debug)]
pub struct CategoryEncoder {
    columns: Vec<String>,
}

impl CategoryEncoder {
    /// Create an encoder for the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Default for CategoryEncoder {
    fn default() -> Self {
        Self::new(CATEGORICAL_COLUMNS)
    }
}

/// Learned categories of one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub column: String,
    /// Distinct categories in sorted order; the code of a category is its index.
    pub classes: Vec<String>,
}

/// Serializable parameters for a fitted CategoryEncoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParams {
    pub tables: Vec<CategoryTable>,
}

/// Fitted CategoryEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedCategoryEncoder {
    tables: Vec<CategoryTable>,
    /// Mapping from category to code, one map per table.
    lookup: Vec<HashMap<String, usize>>,
}

fn text_cells<'a>(frame: &'a Frame, column: &str) -> Result<&'a [Option<String>]> {
    let cells = frame
        .column(column)
        .ok_or_else(|| PipelineError::Schema {
            missing: vec![column.to_string()],
        })?;
    cells.as_text().ok_or_else(|| PipelineError::Type {
        column: column.to_string(),
        expected: "categorical text",
    })
}

fn build_lookup(tables: &[CategoryTable]) -> Vec<HashMap<String, usize>> {
    tables
        .iter()
        .map(|t| {
            t.classes
                .iter()
                .enumerate()
                .map(|(idx, class)| (class.clone(), idx))
                .collect()
        })
        .collect()
}

impl Transformer for CategoryEncoder {
    type Params = EncodingParams;
    type Fitted = FittedCategoryEncoder;

    fn fit(&self, frame: &Frame) -> Result<Self::Fitted> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit CategoryEncoder on empty data".to_string(),
            ));
        }

        let mut tables = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let cells = text_cells(frame, column)?;
            let mut classes = BTreeSet::new();
            for cell in cells {
                match cell {
                    Some(value) => {
                        classes.insert(value.clone());
                    }
                    None => {
                        return Err(PipelineError::MissingValues(format!(
                            "column '{}' has nulls and cannot be encoded",
                            column
                        )))
                    }
                }
            }

            let table = CategoryTable {
                column: column.clone(),
                classes: classes.into_iter().collect(),
            };
            info!("Encoded {}: {} categories", column, table.classes.len());
            tables.push(table);
        }

        let lookup = build_lookup(&tables);
        Ok(FittedCategoryEncoder { tables, lookup })
    }
}

impl FittedCategoryEncoder {
    /// Learned tables, one per encoded column.
    pub fn tables(&self) -> &[CategoryTable] {
        &self.tables
    }

    /// Sorted categories of `column`.
    pub fn classes(&self, column: &str) -> Option<&[String]> {
        self.position(column).map(|i| self.tables[i].classes.as_slice())
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.column == column)
    }

    /// Code of a single category value.
    ///
    /// # Errors
    /// Returns [`PipelineError::UnknownCategory`] for a category not seen at fit
    /// time and [`PipelineError::Schema`] for a column the encoder does not own.
    pub fn encode(&self, column: &str, value: &str) -> Result<usize> {
        let idx = self.position(column).ok_or_else(|| PipelineError::Schema {
            missing: vec![column.to_string()],
        })?;
        self.lookup[idx]
            .get(value)
            .copied()
            .ok_or_else(|| PipelineError::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Category for a code.
    pub fn decode(&self, column: &str, code: usize) -> Result<&str> {
        let idx = self.position(column).ok_or_else(|| PipelineError::Schema {
            missing: vec![column.to_string()],
        })?;
        let classes = &self.tables[idx].classes;
        classes.get(code).map(String::as_str).ok_or_else(|| {
            PipelineError::InvalidArgument(format!(
                "code {} out of bounds for column '{}' ({} categories)",
                code,
                column,
                classes.len()
            ))
        })
    }
}

impl FittedTransformer for FittedCategoryEncoder {
    type Params = EncodingParams;

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let mut out = frame.clone();
        for table in &self.tables {
            let cells = text_cells(frame, &table.column)?;
            let codes = cells
                .iter()
                .map(|cell| match cell {
                    Some(value) => self.encode(&table.column, value).map(|c| Some(c as f64)),
                    None => Err(PipelineError::MissingValues(format!(
                        "column '{}' has nulls and cannot be encoded",
                        table.column
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            out = out.with_column(&table.column, Column::Numeric(codes))?;
        }
        Ok(out)
    }

    fn inverse_transform(&self, frame: &Frame) -> Result<Frame> {
        let mut out = frame.clone();
        for table in &self.tables {
            let codes = frame.numeric(&table.column)?;
            let values = codes
                .iter()
                .map(|code| match code {
                    Some(c) if *c >= 0.0 && c.fract() == 0.0 => self
                        .decode(&table.column, *c as usize)
                        .map(|s| Some(s.to_string())),
                    Some(c) => Err(PipelineError::InvalidArgument(format!(
                        "{} is not a valid code for column '{}'",
                        c, table.column
                    ))),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            out = out.with_column(&table.column, Column::Text(values))?;
        }
        Ok(out)
    }

    fn extract_params(&self) -> Self::Params {
        EncodingParams {
            tables: self.tables.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        for table in &params.tables {
            let sorted = table.classes.windows(2).all(|w| w[0] < w[1]);
            if !sorted {
                return Err(PipelineError::Serialization(format!(
                    "categories of '{}' are not strictly sorted",
                    table.column
                )));
            }
        }
        let lookup = build_lookup(&params.tables);
        Ok(Self {
            tables: params.tables,
            lookup,
        })
    }

    fn columns(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.column.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CONTRACT;

    fn contract_frame(values: &[&str]) -> Frame {
        Frame::new(vec![(
            CONTRACT.to_string(),
            Column::Text(values.iter().map(|v| Some(v.to_string())).collect()),
        )])
        .unwrap()
    }

    #[test]
    fn test_codes_follow_sorted_order() {
        let frame = contract_frame(&["Month-to-month", "One year", "Two year", "One year"]);
        let encoder = CategoryEncoder::new([CONTRACT]);
        let (fitted, encoded) = encoder.fit_transform(&frame).unwrap();

        assert_eq!(
            fitted.classes(CONTRACT).unwrap(),
            &["Month-to-month", "One year", "Two year"]
        );
        assert_eq!(
            encoded.numeric(CONTRACT).unwrap(),
            &[Some(0.0), Some(1.0), Some(2.0), Some(1.0)]
        );
    }

    #[test]
    fn test_codes_ignore_first_seen_order() {
        let frame = contract_frame(&["b", "c", "a"]);
        let fitted = CategoryEncoder::new([CONTRACT]).fit(&frame).unwrap();
        assert_eq!(fitted.encode(CONTRACT, "a").unwrap(), 0);
        assert_eq!(fitted.encode(CONTRACT, "c").unwrap(), 2);
    }

    #[test]
    fn test_unknown_category_error() {
        let fitted = CategoryEncoder::new([CONTRACT])
            .fit(&contract_frame(&["One year"]))
            .unwrap();
        let result = fitted.transform(&contract_frame(&["Two year"]));
        assert!(matches!(
            result,
            Err(PipelineError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_inverse_transform() {
        let frame = contract_frame(&["Two year", "One year"]);
        let (fitted, encoded) = CategoryEncoder::new([CONTRACT])
            .fit_transform(&frame)
            .unwrap();
        let recovered = fitted.inverse_transform(&encoded).unwrap();
        assert_eq!(recovered, frame);
    }

    #[test]
    fn test_null_category_rejected() {
        let frame = Frame::new(vec![(
            CONTRACT.to_string(),
            Column::Text(vec![Some("One year".into()), None]),
        )])
        .unwrap();
        let result = CategoryEncoder::new([CONTRACT]).fit(&frame);
        assert!(matches!(result, Err(PipelineError::MissingValues(_))));
    }

    #[test]
    fn test_numeric_column_rejected() {
        let frame = Frame::new(vec![(
            CONTRACT.to_string(),
            Column::Numeric(vec![Some(1.0)]),
        )])
        .unwrap();
        let result = CategoryEncoder::new([CONTRACT]).fit(&frame);
        assert!(matches!(result, Err(PipelineError::Type { .. })));
    }

    #[test]
    fn test_empty_data() {
        let frame = contract_frame(&[]);
        let result = CategoryEncoder::new([CONTRACT]).fit(&frame);
        assert!(matches!(result, Err(PipelineError::EmptyData(_))));
    }

    #[test]
    fn test_passes_through_other_columns() {
        let frame = Frame::new(vec![
            (
                CONTRACT.to_string(),
                Column::Text(vec![Some("One year".into())]),
            ),
            (
                "CustomerID".to_string(),
                Column::Text(vec![Some("C-1".into())]),
            ),
        ])
        .unwrap();
        let (_, encoded) = CategoryEncoder::new([CONTRACT]).fit_transform(&frame).unwrap();
        assert_eq!(encoded.column("CustomerID"), frame.column("CustomerID"));
    }

    #[test]
    fn test_save_load_file() {
        let frame = contract_frame(&["One year", "Month-to-month"]);
        let fitted = CategoryEncoder::new([CONTRACT]).fit(&frame).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let temp_file = dir.path().join("encoders.bin");
        fitted.save_to_file(&temp_file).unwrap();
        let loaded = FittedCategoryEncoder::load_from_file(&temp_file).unwrap();

        assert_eq!(loaded.tables(), fitted.tables());
        assert_eq!(
            loaded.transform(&frame).unwrap(),
            fitted.transform(&frame).unwrap()
        );
    }

    #[test]
    fn test_from_params_rejects_unsorted() {
        let params = EncodingParams {
            tables: vec![CategoryTable {
                column: CONTRACT.to_string(),
                classes: vec!["b".into(), "a".into()],
            }],
        };
        assert!(FittedCategoryEncoder::from_params(params).is_err());
    }
}
