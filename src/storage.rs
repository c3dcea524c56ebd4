//! Named-blob storage.
//!
//! Artifacts are stored as whole blobs under flat names. Two backends are
//! provided behind the [`Storage`] trait: [`FileStorage`] keeps one file per
//! blob inside a directory, [`MemoryStorage`] keeps blobs in a map and is
//! used by tests and offline tooling.
//!
//! ```
//! use sentiscope::storage::{MemoryStorage, Storage};
//!
//! let storage = MemoryStorage::new();
//! storage.write_file("model.bin", b"weights").unwrap();
//! assert_eq!(storage.read_file("model.bin").unwrap(), b"weights");
//! ```

use std::fmt;

use thiserror::Error;

use crate::error::{Result, SentiscopeError};

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A backend that stores and retrieves named blobs.
pub trait Storage: Send + Sync + fmt::Debug {
    /// Read a whole blob.
    fn read_file(&self, name: &str) -> Result<Vec<u8>>;

    /// Create or replace a blob. Readers never observe a partial write.
    fn write_file(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Check if a blob exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a blob. Deleting a missing blob is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// All blob names, sorted.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Size of a blob in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;

    /// Human-readable location of a blob, for log messages.
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Storage-specific failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<StorageError> for SentiscopeError {
    fn from(err: StorageError) -> Self {
        SentiscopeError::Storage(err.to_string())
    }
}

/// Blob names are flat; path separators and dot segments are rejected.
pub(crate) fn check_name(name: &str) -> std::result::Result<(), StorageError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        assert!(check_name("sentiment_model.bin").is_ok());
        assert!(check_name("").is_err());
        assert!(check_name("..").is_err());
        assert!(check_name("../etc/passwd").is_err());
        assert!(check_name("a\\b").is_err());
    }

    #[test]
    fn test_error_conversion() {
        let err: SentiscopeError = StorageError::FileNotFound("x.bin".to_string()).into();
        assert_eq!(err.to_string(), "Storage error: File not found: x.bin");
    }
}
