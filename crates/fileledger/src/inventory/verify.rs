//! Re-check a finished store against the signature it was sealed with.

use crate::error::{InventoryError, Result};
use fileledger_db::{FileRecord, RecordStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub store_path: PathBuf,
    pub records: u64,
    /// Signature recorded by the run
    pub expected: String,
    /// Signature of the table as it is now
    pub actual: String,
    pub matches: bool,
}

/// Recompute the `data` digest with the latest run's challenge and compare.
pub fn verify(store_path: &Path) -> Result<VerifyReport> {
    let store = RecordStore::open(store_path)?;
    let meta = store.latest_metadata()?.ok_or_else(|| {
        InventoryError::InvalidState(format!(
            "{} has no metadata row; the run never completed",
            store_path.display()
        ))
    })?;

    let actual = store.digest::<FileRecord>(&meta.challenge)?;
    let records = store.count()?;
    store.close()?;

    let matches = actual == meta.signature_md5;
    if matches {
        info!(store = %store_path.display(), records, "signature verified");
    } else {
        warn!(
            store = %store_path.display(),
            expected = %meta.signature_md5,
            actual = %actual,
            "signature mismatch"
        );
    }

    Ok(VerifyReport {
        store_path: store_path.to_path_buf(),
        records,
        expected: meta.signature_md5,
        actual,
        matches,
    })
}
