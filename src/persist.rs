//! Writing the split and fitted artifacts to an output directory.
//!
//! Six files are produced together:
//!
//! | file            | content                          |
//! |-----------------|----------------------------------|
//! | `X_train.csv`   | train features                   |
//! | `X_test.csv`    | test features                    |
//! | `y_train.csv`   | train labels                     |
//! | `y_test.csv`    | test labels                      |
//! | `encoders.bin`  | category tables (bincode)        |
//! | `scaler.bin`    | per-column mean/std (bincode)    |
//!
//! Every file is first written to a temporary file in the target directory.
//! Only after all six writes succeed are they renamed over any previous
//! outputs, so a failed write leaves an earlier run's files in place.
//! Concurrent runs against one directory are not coordinated.

use crate::dataset::{write_frame, Frame};
use crate::error::{PipelineError, Result};
use crate::preprocessing::{FittedCategoryEncoder, FittedStandardScaler, FittedTransformer};
use crate::split::Split;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const X_TRAIN_FILE: &str = "X_train.csv";
pub const X_TEST_FILE: &str = "X_test.csv";
pub const Y_TRAIN_FILE: &str = "y_train.csv";
pub const Y_TEST_FILE: &str = "y_test.csv";
pub const ENCODERS_FILE: &str = "encoders.bin";
pub const SCALER_FILE: &str = "scaler.bin";

/// Every file a complete run leaves behind.
pub const OUTPUT_FILES: [&str; 6] = [
    X_TRAIN_FILE,
    X_TEST_FILE,
    Y_TRAIN_FILE,
    Y_TEST_FILE,
    ENCODERS_FILE,
    SCALER_FILE,
];

/// Handle to an output directory written by [`persist`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persisted {
    dir: PathBuf,
}

impl Persisted {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one output file.
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Output files absent from `dir`.
    pub fn missing_files<P: AsRef<Path>>(dir: P) -> Vec<&'static str> {
        let dir = dir.as_ref();
        OUTPUT_FILES
            .into_iter()
            .filter(|file| !dir.join(file).is_file())
            .collect()
    }

    /// Whether `dir` holds a full set of outputs.
    pub fn is_complete<P: AsRef<Path>>(dir: P) -> bool {
        Self::missing_files(dir).is_empty()
    }

    pub fn load_encoder(&self) -> Result<FittedCategoryEncoder> {
        FittedCategoryEncoder::load_from_file(self.path(ENCODERS_FILE))
    }

    pub fn load_scaler(&self) -> Result<FittedStandardScaler> {
        FittedStandardScaler::load_from_file(self.path(SCALER_FILE))
    }
}

enum Payload<'a> {
    Table(&'a Frame),
    Blob(Vec<u8>),
}

fn stage(dir: &Path, payload: &Payload<'_>) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    match payload {
        Payload::Table(frame) => write_frame(frame, BufWriter::new(tmp.as_file_mut()))?,
        Payload::Blob(bytes) => tmp.write_all(bytes)?,
    }
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Write the split and artifacts to `dir`, replacing previous outputs.
///
/// # Errors
/// Returns [`PipelineError::Io`] if the directory cannot be created or any
/// file cannot be written, and [`PipelineError::Serialization`] if an
/// artifact cannot be encoded.
pub fn persist<P: AsRef<Path>>(
    split: &Split,
    encoder: &FittedCategoryEncoder,
    scaler: &FittedStandardScaler,
    dir: P,
) -> Result<Persisted> {
    let dir = dir.as_ref();
    info!("Saving processed data to {}...", dir.display());
    std::fs::create_dir_all(dir)?;

    let payloads = [
        (X_TRAIN_FILE, Payload::Table(&split.x_train)),
        (X_TEST_FILE, Payload::Table(&split.x_test)),
        (Y_TRAIN_FILE, Payload::Table(&split.y_train)),
        (Y_TEST_FILE, Payload::Table(&split.y_test)),
        (ENCODERS_FILE, Payload::Blob(encoder.to_bytes()?)),
        (SCALER_FILE, Payload::Blob(scaler.to_bytes()?)),
    ];

    let mut staged = Vec::with_capacity(payloads.len());
    for (name, payload) in &payloads {
        staged.push((*name, stage(dir, payload)?));
        debug!(file = name, "staged output");
    }

    for (name, tmp) in staged {
        tmp.persist(dir.join(name))
            .map_err(|e| PipelineError::Io(e.error))?;
    }

    info!("Processed data saved");
    Ok(Persisted::new(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::preprocessing::{CategoryEncoder, StandardScaler, Transformer};

    fn fixture() -> (Split, FittedCategoryEncoder, FittedStandardScaler) {
        let frame = Frame::new(vec![
            (
                "Age".to_string(),
                Column::Numeric((0..10).map(|i| Some(20.0 + i as f64)).collect()),
            ),
            (
                "Contract".to_string(),
                Column::Text((0..10).map(|i| Some(format!("c{}", i % 3))).collect()),
            ),
            (
                "Churn".to_string(),
                Column::Numeric((0..10).map(|i| Some((i % 2) as f64)).collect()),
            ),
        ])
        .unwrap();
        let (encoder, frame) = CategoryEncoder::new(["Contract"]).fit_transform(&frame).unwrap();
        let (scaler, frame) = StandardScaler::new(["Age"]).fit_transform(&frame).unwrap();
        let split = crate::split::stratified_split(&frame, 0.2, 42).unwrap();
        (split, encoder, scaler)
    }

    #[test]
    fn test_persist_writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("processed");
        let (split, encoder, scaler) = fixture();

        assert!(!Persisted::is_complete(&out));
        let persisted = persist(&split, &encoder, &scaler, &out).unwrap();
        assert!(Persisted::is_complete(&out));

        let y_test = std::fs::read_to_string(persisted.path(Y_TEST_FILE)).unwrap();
        assert!(y_test.starts_with("Churn\n"));
        assert_eq!(y_test.lines().count(), 1 + split.test_rows.len());

        assert_eq!(persisted.load_encoder().unwrap().tables(), encoder.tables());
        assert_eq!(persisted.load_scaler().unwrap().scales(), scaler.scales());
    }

    #[test]
    fn test_persist_overwrites_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (split, encoder, scaler) = fixture();
        std::fs::write(dir.path().join(X_TRAIN_FILE), "stale").unwrap();

        persist(&split, &encoder, &scaler, dir.path()).unwrap();
        let x_train = std::fs::read_to_string(dir.path().join(X_TRAIN_FILE)).unwrap();
        assert!(x_train.starts_with("Age,Contract\n"));
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let (split, encoder, scaler) = fixture();
        persist(&split, &encoder, &scaler, dir.path()).unwrap();
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, OUTPUT_FILES.len());
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(X_TRAIN_FILE), "").unwrap();
        let missing = Persisted::missing_files(dir.path());
        assert_eq!(missing.len(), 5);
        assert!(!missing.contains(&X_TRAIN_FILE));
    }

    #[test]
    fn test_persist_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let (split, encoder, scaler) = fixture();
        let result = persist(&split, &encoder, &scaler, blocker.join("out"));
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }
}
