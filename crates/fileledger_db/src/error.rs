//! Error types for the record store.

use thiserror::Error;

/// Store operation result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Store errors.
///
/// Every variant is fatal to an inventory run; per-file I/O failures never
/// reach this type.
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLite error (open, prepare, step, commit)
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error (file system operations around the store file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file or row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A store file already exists where a fresh one was requested
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Constraint violation (missing row on update, bad column value)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Invalid state (corrupt row, unexpected schema)
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DbError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a constraint error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
