//! fileledger: full-disk file inventory.
//!
//! Every regular file under a root becomes one row in a per-run SQLite store.
//! Rows are enriched with size, timestamps, and an MD5 of the content by a pool
//! of worker threads, then the table is sealed with a salted signature that
//! [`inventory::verify`] can recheck later.

pub mod config;
pub mod error;
pub mod host;
pub mod inventory;

pub use config::InventoryConfig;
pub use error::{InventoryError, Result};
pub use host::{HostProbe, SystemProbe};
pub use inventory::{InventoryRun, ProgressReporter, RunSummary, VerifyReport};
