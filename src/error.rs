//! Error types for the Sentiscope library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SentiscopeError`] enum. Client input problems are carried separately as
//! [`ValidationError`] so the serving layer can report the violated
//! constraint precisely.
//!
//! # Examples
//!
//! ```
//! use sentiscope::error::{Result, SentiscopeError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SentiscopeError::corpus("corpus file is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Sentiscope operations.
#[derive(Error, Debug)]
pub enum SentiscopeError {
    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Feature extraction errors (fitting or transforming).
    #[error("Feature error: {0}")]
    Feature(String),

    /// Invalid or unusable training corpus.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Model fitting or model selection errors.
    #[error("Training error: {0}")]
    Training(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing, corrupt or incompatible artifact blobs.
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Client input that violates the request contract.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service has no loaded artifact.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Unexpected failure while scoring a batch.
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with SentiscopeError.
pub type Result<T> = std::result::Result<T, SentiscopeError>;

impl SentiscopeError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Analysis(msg.into())
    }

    /// Create a new feature extraction error.
    pub fn feature<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Feature(msg.into())
    }

    /// Create a new corpus error.
    pub fn corpus<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Corpus(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Training(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Storage(msg.into())
    }

    /// Create a new artifact error.
    pub fn artifact<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Artifact(msg.into())
    }

    /// Create a new service unavailable error.
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::ServiceUnavailable(msg.into())
    }

    /// Create a new prediction error.
    pub fn prediction<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Prediction(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Config(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::SerializationError(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SentiscopeError::Other(msg.into())
    }

    /// Whether this error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SentiscopeError::Validation(_))
    }

    /// Whether this error means the service cannot serve at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SentiscopeError::ServiceUnavailable(_))
    }
}

impl From<bincode::Error> for SentiscopeError {
    fn from(err: bincode::Error) -> Self {
        SentiscopeError::SerializationError(err.to_string())
    }
}

/// A violated request constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The batch holds too few or too many comments.
    #[error("batch must contain between {min} and {max} comments, got {actual}")]
    BatchSize {
        actual: usize,
        min: usize,
        max: usize,
    },

    /// A comment text is too short or too long.
    #[error("comments[{index}].text must be between {min} and {max} characters, got {actual}")]
    TextLength {
        index: usize,
        actual: usize,
        min: usize,
        max: usize,
    },

    /// The request body could not be understood.
    #[error("malformed request: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SentiscopeError::corpus("no rows");
        assert_eq!(error.to_string(), "Corpus error: no rows");

        let error = SentiscopeError::artifact("missing blob");
        assert_eq!(error.to_string(), "Artifact error: missing blob");

        let error = SentiscopeError::prediction("boom");
        assert_eq!(error.to_string(), "Prediction error: boom");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SentiscopeError::from(io_error);

        match error {
            SentiscopeError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }
    }

    #[test]
    fn test_validation_classification() {
        let error: SentiscopeError = ValidationError::BatchSize {
            actual: 0,
            min: 1,
            max: 500,
        }
        .into();
        assert!(error.is_client_error());
        assert!(!error.is_unavailable());
        assert_eq!(
            error.to_string(),
            "batch must contain between 1 and 500 comments, got 0"
        );

        let error = SentiscopeError::unavailable("Model not loaded");
        assert!(error.is_unavailable());
        assert!(!error.is_client_error());
    }
}
