//! Standard Scaler (Z-score normalization).
//!
//! Transforms numeric columns by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the fitted column and `s` its population standard
//! deviation (ddof = 0). Null cells are ignored when fitting and stay null.
//!
//! A column whose values are all equal has `s = 0`; fitting fails with
//! [`PipelineError::DivideByZero`] instead of producing NaN or silently
//! substituting a unit scale.

use crate::dataset::{Column, Frame};
use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::schema::NUMERIC_COLUMNS;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Learned statistics of one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub column: String,
    pub mean: f64,
    pub std: f64,
}

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub config: StandardScalerConfig,
    pub scales: Vec<ColumnScale>,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug)]
pub struct StandardScaler {
    columns: Vec<String>,
    config: StandardScalerConfig,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new(NUMERIC_COLUMNS)
    }
}

impl StandardScaler {
    /// Create a scaler for the given columns with default configuration.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            config: StandardScalerConfig::default(),
        }
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Population mean and standard deviation of the finite values.
///
/// Returns `None` when there are no finite values.
pub fn mean_std(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if present.is_empty() {
        return None;
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let var = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    // Rounding can leave a tiny non-zero spread on a constant column.
    let constant = present.iter().all(|&x| x == present[0]);
    Some((mean, if constant { 0.0 } else { var.sqrt() }))
}

impl Transformer for StandardScaler {
    type Params = ScalingParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, frame: &Frame) -> Result<Self::Fitted> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let mut scales = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = frame.numeric(column)?;
            let (mean, std) = mean_std(values).ok_or_else(|| {
                PipelineError::EmptyData(format!("column '{}' has no non-null values", column))
            })?;
            if self.config.with_std && std == 0.0 {
                return Err(PipelineError::DivideByZero {
                    column: column.clone(),
                });
            }
            debug!(column = %column, mean, std, "fitted column scale");

            scales.push(ColumnScale {
                column: column.clone(),
                mean: if self.config.with_mean { mean } else { 0.0 },
                std: if self.config.with_std { std } else { 1.0 },
            });
        }

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            scales,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    scales: Vec<ColumnScale>,
}

impl FittedStandardScaler {
    /// Learned statistics, one entry per scaled column.
    pub fn scales(&self) -> &[ColumnScale] {
        &self.scales
    }

    pub fn scale_of(&self, column: &str) -> Option<&ColumnScale> {
        self.scales.iter().find(|s| s.column == column)
    }

    /// Standardize a single value of `column`.
    pub fn scale_value(&self, column: &str, value: f64) -> Result<f64> {
        let scale = self.scale_of(column).ok_or_else(|| PipelineError::Schema {
            missing: vec![column.to_string()],
        })?;
        Ok((value - scale.mean) / scale.std)
    }

    fn map_columns<F>(&self, frame: &Frame, f: F) -> Result<Frame>
    where
        F: Fn(f64, &ColumnScale) -> f64,
    {
        let mut out = frame.clone();
        for scale in &self.scales {
            let values = frame.numeric(&scale.column)?;
            let mapped = values.iter().map(|v| v.map(|x| f(x, scale))).collect();
            out = out.with_column(&scale.column, Column::Numeric(mapped))?;
        }
        Ok(out)
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Params = ScalingParams;

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        self.map_columns(frame, |x, s| (x - s.mean) / s.std)
    }

    fn inverse_transform(&self, frame: &Frame) -> Result<Frame> {
        self.map_columns(frame, |x, s| x * s.std + s.mean)
    }

    fn extract_params(&self) -> Self::Params {
        ScalingParams {
            config: self.config.clone(),
            scales: self.scales.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if let Some(bad) = params
            .scales
            .iter()
            .find(|s| !s.mean.is_finite() || !s.std.is_finite() || s.std == 0.0)
        {
            return Err(PipelineError::Serialization(format!(
                "invalid scale for column '{}': mean={}, std={}",
                bad.column, bad.mean, bad.std
            )));
        }
        Ok(Self {
            config: params.config,
            scales: params.scales,
        })
    }

    fn columns(&self) -> Vec<&str> {
        self.scales.iter().map(|s| s.column.as_str()).collect()
    }
}
