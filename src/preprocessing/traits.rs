//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; knows which columns it applies to.
//! - [`FittedTransformer`]: After fitting; reusable on any later frame and
//!   serializable as a parameter blob.

use crate::dataset::Frame;
use crate::error::{PipelineError, Result};
use crate::serialization::SerializableParams;
use std::path::Path;

/// Trait for unfitted transformers.
///
/// A transformer learns parameters from a frame once and can then transform
/// new frames using exactly those parameters; it is never re-fit on new data.
///
/// # Example
/// ```ignore
/// use churnprep::preprocessing::{StandardScaler, Transformer, FittedTransformer};
///
/// let scaler = StandardScaler::default();
/// let fitted = scaler.fit(&frame)?;
/// let scaled = fitted.transform(&new_frame)?;
/// ```
pub trait Transformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params>;

    /// Fit the transformer to `frame`.
    ///
    /// # Errors
    /// Returns [`PipelineError`] if:
    /// - The frame is empty
    /// - A target column is absent or has the wrong kind
    /// - The data is degenerate for this transformer
    fn fit(&self, frame: &Frame) -> Result<Self::Fitted>;

    /// Fit on `frame` and transform it, returning both the fitted transformer
    /// and the transformed frame.
    fn fit_transform(&self, frame: &Frame) -> Result<(Self::Fitted, Frame)> {
        let fitted = self.fit(frame)?;
        let transformed = fitted.transform(frame)?;
        Ok((fitted, transformed))
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` / `load_from_file` use the bincode blob format.
pub trait FittedTransformer: Clone + Sized {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform a frame using the learned parameters.
    ///
    /// Columns the transformer does not own are passed through unchanged.
    fn transform(&self, frame: &Frame) -> Result<Frame>;

    /// Reverse the transformation.
    fn inverse_transform(&self, frame: &Frame) -> Result<Frame>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self>;

    /// Names of the columns this transformer owns.
    fn columns(&self) -> Vec<&str>;

    /// Serialize the learned parameters to bytes.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        self.extract_params()
            .to_bytes()
            .map_err(|e| PipelineError::Serialization(e.to_string()))
    }

    /// Save the fitted transformer to a file, replacing any existing file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let params = crate::serialization::read_params::<Self::Params, _>(path)?;
        Self::from_params(params)
    }
}
