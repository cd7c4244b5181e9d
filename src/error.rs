//! Error types for pipeline operations.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error type for every pipeline stage.
///
/// All variants are fatal to the current run; nothing is retried internally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist.
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Input exists but cannot be parsed as a delimited table.
    #[error("Format error: {0}")]
    Format(String),
    /// One or more required columns are absent.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    /// A column holds values of the wrong kind.
    #[error("Type error: column '{column}' must be {expected}")]
    Type {
        column: String,
        expected: &'static str,
    },
    /// Invalid hyperparameter or argument value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Data contains missing values where none are allowed.
    #[error("Missing values: {0}")]
    MissingValues(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// A numeric column has zero standard deviation and cannot be standardized.
    #[error("Division by zero: column '{column}' has zero standard deviation")]
    DivideByZero { column: String },
    /// A category was not seen when the encoder was fitted.
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },
    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => PipelineError::Io(io),
                other => PipelineError::Format(format!("{:?}", other)),
            }
        } else {
            PipelineError::Format(err.to_string())
        }
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::InvalidArgument(format!("invalid config: {}", err))
    }
}
