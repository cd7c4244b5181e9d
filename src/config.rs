//! Run configuration for the preprocessing pipeline.
//!
//! A configuration can be built in code, parsed from TOML, or taken from
//! [`PipelineConfig::default`]. Omitted TOML keys fall back to the defaults:
//!
//! ```toml
//! data_path = "data/sample_data.csv"
//! output_dir = "data/processed"
//! test_size = 0.2
//! random_state = 42
//! delimiter = ","
//! ```

use crate::dataset::LoadOptions;
use crate::error::{PipelineError, Result};
use crate::split::{DEFAULT_RANDOM_STATE, DEFAULT_TEST_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_DATA_PATH: &str = "data/sample_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Input delimited file.
    pub data_path: PathBuf,
    /// Directory receiving the six output files.
    pub output_dir: PathBuf,
    /// Fraction of rows held out for testing, in `(0, 1)`.
    pub test_size: f64,
    /// Seed for the stratified split.
    pub random_state: u64,
    /// Single ASCII field delimiter.
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    pub fn with_data_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    /// [`PipelineError::NotFound`] if the file does not exist and
    /// [`PipelineError::InvalidArgument`] if it does not describe a valid
    /// configuration.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
            _ => PipelineError::Io(e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::InvalidArgument(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(PipelineError::InvalidArgument(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(PipelineError::InvalidArgument(
                "data_path must not be empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(PipelineError::InvalidArgument(
                "output_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Loader options derived from this configuration.
    pub fn load_options(&self) -> LoadOptions {
        // validate() guarantees ASCII
        LoadOptions::default().with_delimiter(self.delimiter as u8)
    }
}
