//! Error types for an inventory run

use std::io;
use thiserror::Error;

/// Run-fatal errors. Per-file stat and hash failures never become one of
/// these; they are recorded as empty fields on the record instead.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Store error: {0}")]
    Db(#[from] fileledger_db::DbError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Insufficient privileges: {0}")]
    Privilege(String),

    #[error("Root not found: {0}")]
    RootNotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, InventoryError>;
