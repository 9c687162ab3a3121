//! Error types for persistence operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, configuration and backend-specific storage failures.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Storage key is empty or otherwise unusable.
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Failure reported by a non-file backend (e.g. SQLite).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
