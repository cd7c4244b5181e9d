//! Serialization of fitted preprocessing artifacts.
//!
//! Fitted encoders and scalers are persisted as their plain parameter structs,
//! never as live transformer values, so a blob written by one run can be read
//! back by any later consumer.

use std::error::Error;
use std::path::Path;

/// A parameter representation that can be serialized to and from bytes.
///
/// Implementors should contain only plain data (category lists, per-column
/// statistics), not derived lookup tables.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Read a parameter blob from disk.
pub fn read_params<T, P>(path: P) -> crate::error::Result<T>
where
    T: SerializableParams,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path)?;
    T::from_bytes(&bytes)
        .map_err(|e| crate::error::PipelineError::Serialization(e.to_string()))
}
