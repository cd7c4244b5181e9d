//! Loading persisted outputs as dense matrices for model training.

use crate::config::PipelineConfig;
use crate::dataset::{load_frame, Frame, LoadOptions};
use crate::error::{PipelineError, Result};
use crate::persist::{Persisted, X_TEST_FILE, X_TRAIN_FILE, Y_TEST_FILE, Y_TRAIN_FILE};
use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::info;

/// Train/test matrices read back from an output directory.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedData {
    pub feature_names: Vec<String>,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

impl ProcessedData {
    /// Read the four tabular outputs from `dir`.
    ///
    /// # Errors
    /// - [`PipelineError::NotFound`] if a file is absent
    /// - [`PipelineError::Type`] / [`PipelineError::MissingValues`] if a cell
    ///   is not a number
    /// - [`PipelineError::Format`] if train and test features disagree or a
    ///   label file does not hold exactly one column
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let options = LoadOptions::default();
        let x_train = load_frame(dir.join(X_TRAIN_FILE), &options)?;
        let x_test = load_frame(dir.join(X_TEST_FILE), &options)?;
        if x_train.names() != x_test.names() {
            return Err(PipelineError::Format(format!(
                "feature columns differ between {} and {}",
                X_TRAIN_FILE, X_TEST_FILE
            )));
        }
        let y_train = load_frame(dir.join(Y_TRAIN_FILE), &options)?;
        let y_test = load_frame(dir.join(Y_TEST_FILE), &options)?;

        let data = Self {
            feature_names: x_train.names().to_vec(),
            x_train: to_matrix(&x_train)?,
            x_test: to_matrix(&x_test)?,
            y_train: to_vector(&y_train)?,
            y_test: to_vector(&y_test)?,
        };
        if data.x_train.nrows() != data.y_train.len() || data.x_test.nrows() != data.y_test.len()
        {
            return Err(PipelineError::Format(
                "feature and label row counts differ".to_string(),
            ));
        }
        info!(
            "Loaded processed data: {} train / {} test rows, {} features",
            data.x_train.nrows(),
            data.x_test.nrows(),
            data.n_features()
        );
        Ok(data)
    }

    /// Load the outputs in `config.output_dir`, running the pipeline first if
    /// any of them is missing.
    pub fn load_or_run(config: &PipelineConfig) -> Result<Self> {
        let missing = Persisted::missing_files(&config.output_dir);
        if !missing.is_empty() {
            info!(
                "Processed data not found ({}). Running preprocessing pipeline...",
                missing.join(", ")
            );
            crate::pipeline::run(config)?;
        }
        Self::load(&config.output_dir)
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

fn numeric_values<'a>(frame: &'a Frame, name: &str) -> Result<impl Iterator<Item = f64> + 'a> {
    let values = frame.numeric(name)?;
    if values.iter().any(Option::is_none) {
        return Err(PipelineError::MissingValues(format!(
            "column '{}' has empty cells",
            name
        )));
    }
    Ok(values.iter().flatten().copied())
}

fn to_matrix(frame: &Frame) -> Result<Array2<f64>> {
    let (rows, cols) = (frame.n_rows(), frame.n_columns());
    let mut columns = Vec::with_capacity(cols);
    for name in frame.names() {
        columns.push(numeric_values(frame, name)?.collect::<Vec<_>>());
    }
    Ok(Array2::from_shape_fn((rows, cols), |(r, c)| columns[c][r]))
}

fn to_vector(frame: &Frame) -> Result<Array1<f64>> {
    match frame.names() {
        [name] => Ok(numeric_values(frame, name)?.collect()),
        names => Err(PipelineError::Format(format!(
            "label file must hold one column, found {}",
            names.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::OUTPUT_FILES;
    use std::fs;

    fn write_outputs(dir: &Path) {
        fs::write(dir.join(X_TRAIN_FILE), "Age,Contract\n0.5,1\n-0.5,0\n1.5,2\n").unwrap();
        fs::write(dir.join(X_TEST_FILE), "Age,Contract\n-1.5,1\n").unwrap();
        fs::write(dir.join(Y_TRAIN_FILE), "Churn\n1\n0\n0\n").unwrap();
        fs::write(dir.join(Y_TEST_FILE), "Churn\n1\n").unwrap();
    }

    #[test]
    fn test_load_matrices() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());
        let data = ProcessedData::load(dir.path()).unwrap();

        assert_eq!(data.feature_names, vec!["Age", "Contract"]);
        assert_eq!(data.x_train.dim(), (3, 2));
        assert_eq!(data.x_train[[2, 0]], 1.5);
        assert_eq!(data.x_train[[2, 1]], 2.0);
        assert_eq!(data.y_train.to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(data.x_test.dim(), (1, 2));
        assert_eq!(data.n_features(), 2);
    }

    #[test]
    fn test_load_rejects_text_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());
        fs::write(dir.path().join(X_TEST_FILE), "Age,Contract\n-1.5,Two year\n").unwrap();
        assert!(matches!(
            ProcessedData::load(dir.path()),
            Err(PipelineError::Type { .. })
        ));

        fs::write(dir.path().join(X_TEST_FILE), "Age,Contract\n,1\n").unwrap();
        assert!(matches!(
            ProcessedData::load(dir.path()),
            Err(PipelineError::MissingValues(_))
        ));
    }

    #[test]
    fn test_load_rejects_mismatched_shapes() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());
        fs::write(dir.path().join(Y_TRAIN_FILE), "Churn\n1\n").unwrap();
        assert!(matches!(
            ProcessedData::load(dir.path()),
            Err(PipelineError::Format(_))
        ));
    }

    #[test]
    fn test_load_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProcessedData::load(dir.path()),
            Err(PipelineError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_or_run_uses_existing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());
        for file in OUTPUT_FILES {
            if !dir.path().join(file).exists() {
                fs::write(dir.path().join(file), b"").unwrap();
            }
        }
        // The input path does not exist, so a rerun would fail.
        let config = PipelineConfig::default()
            .with_data_path(dir.path().join("absent.csv"))
            .with_output_dir(dir.path());
        let data = ProcessedData::load_or_run(&config).unwrap();
        assert_eq!(data.x_train.nrows(), 3);
    }

    #[test]
    fn test_load_or_run_reruns_when_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        write_outputs(dir.path());
        let config = PipelineConfig::default()
            .with_data_path(dir.path().join("absent.csv"))
            .with_output_dir(dir.path());
        assert!(matches!(
            ProcessedData::load_or_run(&config),
            Err(PipelineError::NotFound(_))
        ));
    }
}
