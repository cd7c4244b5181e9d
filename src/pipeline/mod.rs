//! End-to-end preprocessing run: load, validate, clean, encode, split, persist.
//!
//! # Example
//! ```ignore
//! use churnprep::config::PipelineConfig;
//! use churnprep::pipeline::Pipeline;
//!
//! let output = Pipeline::new(PipelineConfig::default())
//!     .load()?
//!     .validate()?
//!     .clean()?
//!     .encode()?
//!     .split()?
//!     .persist()?;
//! println!("{} training rows", output.split.train_rows.len());
//! ```
//!
//! Calling a step out of order does not compile:
//! ```compile_fail
//! use churnprep::config::PipelineConfig;
//! use churnprep::pipeline::Pipeline;
//!
//! let _ = Pipeline::new(PipelineConfig::default()).load().unwrap().encode();
//! ```

mod state;

pub use state::{Cleaned, Encoded, HasFrame, Loaded, Partitioned, Stage, Start, Validated};

use crate::config::PipelineConfig;
use crate::dataset::{load_frame, Frame};
use crate::error::Result;
use crate::persist::{persist, Persisted};
use crate::preprocessing::{
    clean_with_report, validate, CleaningReport, FeatureTransformer, FittedCategoryEncoder,
    FittedStandardScaler, ValidationReport,
};
use crate::split::{stratified_split, Split};
use serde::{Deserialize, Serialize};
use tracing::info;

const BANNER_WIDTH: usize = 50;

/// Summary of what each stage observed and changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub rows_loaded: usize,
    pub validation: Option<ValidationReport>,
    pub cleaning: Option<CleaningReport>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_churn_rate: f64,
    pub test_churn_rate: f64,
}

/// Everything a completed run produced.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub split: Split,
    pub encoder: FittedCategoryEncoder,
    pub scaler: FittedStandardScaler,
    pub persisted: Persisted,
    pub report: PipelineReport,
}

/// A preprocessing run in stage `S`.
#[derive(Clone, Debug)]
pub struct Pipeline<S: Stage> {
    config: PipelineConfig,
    report: PipelineReport,
    state: S,
}

impl<S: Stage> Pipeline<S> {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    fn advance<T: Stage>(self, state: T) -> Pipeline<T> {
        Pipeline {
            config: self.config,
            report: self.report,
            state,
        }
    }
}

impl<S: HasFrame> Pipeline<S> {
    /// Working table at this stage.
    pub fn frame(&self) -> &Frame {
        self.state.frame()
    }
}

impl Pipeline<Start> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            report: PipelineReport::default(),
            state: Start,
        }
    }

    /// Start from a table already in memory instead of reading `data_path`.
    pub fn from_frame(config: PipelineConfig, frame: Frame) -> Result<Pipeline<Loaded>> {
        config.validate()?;
        let mut pipeline = Self::new(config);
        pipeline.report.rows_loaded = frame.n_rows();
        Ok(pipeline.advance(Loaded { frame }))
    }

    /// Validate the configuration and read the input file.
    pub fn load(mut self) -> Result<Pipeline<Loaded>> {
        self.config.validate()?;
        let frame = load_frame(&self.config.data_path, &self.config.load_options())?;
        self.report.rows_loaded = frame.n_rows();
        Ok(self.advance(Loaded { frame }))
    }
}

impl Pipeline<Loaded> {
    pub fn validate(self) -> Result<Pipeline<Validated>> {
        let validation = validate(&self.state.frame)?;
        let Pipeline {
            config,
            mut report,
            state,
        } = self;
        report.validation = Some(validation);
        Ok(Pipeline {
            config,
            report,
            state: Validated { frame: state.frame },
        })
    }
}

impl Pipeline<Validated> {
    pub fn clean(mut self) -> Result<Pipeline<Cleaned>> {
        let (frame, report) = clean_with_report(&self.state.frame)?;
        self.report.cleaning = Some(report);
        Ok(self.advance(Cleaned { frame }))
    }
}

impl Pipeline<Cleaned> {
    /// Encode and scale with the default column sets.
    pub fn encode(self) -> Result<Pipeline<Encoded>> {
        self.encode_with(&FeatureTransformer::default())
    }

    pub fn encode_with(self, transformer: &FeatureTransformer) -> Result<Pipeline<Encoded>> {
        let encoded = transformer.fit_transform(&self.state.frame)?;
        Ok(self.advance(Encoded {
            frame: encoded.frame,
            encoder: encoded.encoder,
            scaler: encoded.scaler,
        }))
    }
}

impl Pipeline<Encoded> {
    pub fn encoder(&self) -> &FittedCategoryEncoder {
        &self.state.encoder
    }

    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.state.scaler
    }

    /// Stratified split using the configured fraction and seed.
    pub fn split(mut self) -> Result<Pipeline<Partitioned>> {
        let split = stratified_split(
            &self.state.frame,
            self.config.test_size,
            self.config.random_state,
        )?;
        let (train_rate, test_rate) = split.churn_rates();
        self.report.train_rows = split.train_rows.len();
        self.report.test_rows = split.test_rows.len();
        self.report.train_churn_rate = train_rate;
        self.report.test_churn_rate = test_rate;

        let Encoded {
            encoder, scaler, ..
        } = self.state;
        Ok(Pipeline {
            config: self.config,
            report: self.report,
            state: Partitioned {
                split,
                encoder,
                scaler,
            },
        })
    }
}

impl Pipeline<Partitioned> {
    pub fn split_data(&self) -> &Split {
        &self.state.split
    }

    /// Write all outputs to the configured directory.
    pub fn persist(self) -> Result<PipelineOutput> {
        let persisted = persist(
            &self.state.split,
            &self.state.encoder,
            &self.state.scaler,
            &self.config.output_dir,
        )?;
        let Partitioned {
            split,
            encoder,
            scaler,
        } = self.state;
        Ok(PipelineOutput {
            split,
            encoder,
            scaler,
            persisted,
            report: self.report,
        })
    }
}

/// Run every stage with `config`.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let rule = "=".repeat(BANNER_WIDTH);
    info!("{}", rule);
    info!("Starting data preprocessing pipeline");
    info!("{}", rule);

    let output = Pipeline::new(config.clone())
        .load()?
        .validate()?
        .clean()?
        .encode()?
        .split()?
        .persist()?;

    info!("{}", rule);
    info!("Data preprocessing completed successfully!");
    info!("{}", rule);
    Ok(output)
}
