//! Error types for Highrise.

use thiserror::Error;

/// Top-level error type for Highrise data handling.
#[derive(Debug, Error)]
pub enum HighriseError {
    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Result type alias for Highrise operations.
pub type HighriseResult<T> = Result<T, HighriseError>;
