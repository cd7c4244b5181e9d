//! # churnprep
//!
//! Preprocessing for tabular customer-churn data. A run reads a delimited
//! file, checks its schema, cleans it, encodes categories, standardizes
//! numeric columns, partitions rows into stratified train/test sets and
//! writes the result together with the fitted encoders and scaler.
//!
//! ```text
//! load -> validate -> clean -> encode/scale -> split -> persist
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use churnprep::{run, PipelineConfig};
//!
//! let config = PipelineConfig::default()
//!     .with_data_path("data/customers.csv")
//!     .with_output_dir("data/processed");
//! let output = run(&config)?;
//! println!("train churn rate: {:.3}", output.report.train_churn_rate);
//! ```
//!
//! Consumers that only need the matrices use [`ProcessedData::load_or_run`],
//! which reruns the pipeline when any output is missing.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod persist;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod serialization;
pub mod split;

pub use cache::ProcessedData;
pub use config::PipelineConfig;
pub use dataset::{load_frame, Column, Frame, LoadOptions};
pub use error::{PipelineError, Result};
pub use persist::{persist, Persisted};
pub use pipeline::{run, Pipeline, PipelineOutput, PipelineReport};
pub use split::{stratified_split, Split};
