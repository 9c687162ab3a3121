//! Error types for SQLite storage operations.
//!
//! Provides a unified error type covering database access, migration and
//! prefix validation failures.

use thiserror::Error;

/// Errors that can occur during SQLite storage operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Migration lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table prefix contains invalid characters.
    #[error("invalid prefix '{0}': must contain only alphanumeric characters and underscores")]
    InvalidPrefix(String),

    /// Error from the generic storage layer (e.g. an invalid key).
    #[error("storage error: {0}")]
    StorageError(#[from] sheetbook_db::DatabaseError),
}

impl From<SqliteError> for sheetbook_db::DatabaseError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::StorageError(inner) => inner,
            other => sheetbook_db::DatabaseError::Backend(other.to_string()),
        }
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
