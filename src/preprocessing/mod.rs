//! Data preprocessing for the churn pipeline.
//!
//! # Stages
//!
//! - [`validate`]: schema and type gate, never mutates data
//! - [`clean`]: median fill, duplicate removal, range filters
//! - [`CategoryEncoder`]: text categories to sorted integer codes
//! - [`StandardScaler`]: Z-score normalization of numeric columns
//!
//! Fitted transformers implement [`FittedTransformer`] and can be saved and
//! loaded, so the exact encoding and scaling applied at training time can be
//! reapplied to any later record.
//!
//! # Example
//!
//! ```ignore
//! use churnprep::preprocessing::{clean, validate, FeatureTransformer};
//!
//! validate(&frame)?;
//! let cleaned = clean(&frame)?;
//! let encoded = FeatureTransformer::default().fit_transform(&cleaned)?;
//! encoded.encoder.save_to_file("encoders.bin")?;
//! ```

pub mod cleaning;
pub mod encoding;
pub mod scaling;
pub mod traits;
pub mod validation;

pub use cleaning::{clean, clean_with_report, CleaningReport};
pub use encoding::{CategoryEncoder, CategoryTable, EncodingParams, FittedCategoryEncoder};
pub use scaling::{
    ColumnScale, FittedStandardScaler, ScalingParams, StandardScaler, StandardScalerConfig,
};
pub use traits::{FittedTransformer, Transformer};
pub use validation::{validate, ValidationReport};

use crate::dataset::Frame;
use crate::error::{PipelineError, Result};
use tracing::info;

/// Category encoding and standard scaling applied to disjoint column sets.
#[derive(Clone, Debug, Default)]
pub struct FeatureTransformer {
    encoder: CategoryEncoder,
    scaler: StandardScaler,
}

/// Output of [`FeatureTransformer::fit_transform`].
#[derive(Clone, Debug)]
pub struct EncodedFrame {
    pub frame: Frame,
    pub encoder: FittedCategoryEncoder,
    pub scaler: FittedStandardScaler,
}

impl FeatureTransformer {
    /// Combine an encoder and a scaler.
    ///
    /// # Errors
    /// Returns [`PipelineError::InvalidArgument`] if a column would be both
    /// encoded and scaled.
    pub fn new(encoder: CategoryEncoder, scaler: StandardScaler) -> Result<Self> {
        let overlap: Vec<&str> = encoder
            .columns()
            .iter()
            .filter(|c| scaler.columns().contains(c))
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(PipelineError::InvalidArgument(format!(
                "columns both encoded and scaled: {}",
                overlap.join(", ")
            )));
        }
        Ok(Self { encoder, scaler })
    }

    /// Fit both transformers on `frame` and apply them.
    pub fn fit_transform(&self, frame: &Frame) -> Result<EncodedFrame> {
        info!("Encoding features...");
        let (encoder, frame) = self.encoder.fit_transform(frame)?;
        let (scaler, frame) = self.scaler.fit_transform(&frame)?;
        info!("Feature encoding completed");
        Ok(EncodedFrame {
            frame,
            encoder,
            scaler,
        })
    }
}

impl EncodedFrame {
    /// Apply the fitted artifacts to a new raw frame without refitting.
    pub fn transform(&self, frame: &Frame) -> Result<Frame> {
        let encoded = self.encoder.transform(frame)?;
        self.scaler.transform(&encoded)
    }
}
