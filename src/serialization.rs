//! Serialization of fitted parameters.
//!
//! Fitted transforms and trained models are persisted as plain parameter structs
//! (no derived caches), encoded with bincode. Writes go through a temporary file
//! followed by a rename so a reader never observes a half-written artifact.

use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

/// A trait for parameter representations that can be serialized to and from bytes.
///
/// Implementors should contain only plain data (e.g., `Vec<f64>`, strings, scalars).
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

/// Write `bytes` to `path` atomically (temp file in the same directory, then rename).
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        weights: Vec<f64>,
        name: String,
    }

    #[test]
    fn test_blanket_params_bytes() {
        let params = Params {
            weights: vec![0.5, -1.25],
            name: "scaler".to_string(),
        };
        let bytes = params.to_bytes().unwrap();
        assert_eq!(Params::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let bad: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        assert!(Params::from_bytes(bad).is_err());
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join("artifact.bin.tmp").exists());
    }
}
