//! Recursive enumeration of a root into placeholder records.
//!
//! Paths are buffered and flushed in batches of `batch_size`, so the store
//! assigns ids in discovery order. Only regular files are recorded.
//! Directories and unreadable subtrees are skipped.

use crate::error::{InventoryError, Result};
use fileledger_db::{FileRecord, RecordStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Destination for batches of placeholder records.
pub trait RecordSink {
    /// Persist one batch atomically, returning how many rows were written.
    fn insert_batch(&mut self, records: &[FileRecord]) -> fileledger_db::Result<u64>;
}

impl RecordSink for RecordStore {
    fn insert_batch(&mut self, records: &[FileRecord]) -> fileledger_db::Result<u64> {
        RecordStore::insert_batch(self, records)
    }
}

/// Counters from one enumeration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnumerationStats {
    pub files: u64,
    pub batches: u64,
}

/// Walk `root` and insert one placeholder per regular file into `sink`.
pub fn enumerate<S: RecordSink + ?Sized>(
    root: &Path,
    sink: &mut S,
    batch_size: usize,
) -> Result<EnumerationStats> {
    if !root.is_dir() {
        return Err(InventoryError::RootNotFound(root.display().to_string()));
    }
    let root = absolute_path(root)?;
    let root = root.as_path();
    let batch_size = batch_size.max(1);
    let mut stats = EnumerationStats::default();
    let mut batch: Vec<FileRecord> = Vec::with_capacity(batch_size);
    let mut skipped = 0u64;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped += 1;
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        batch.push(FileRecord::placeholder(entry.path().to_string_lossy()));
        if batch.len() >= batch_size {
            flush(sink, &mut batch, &mut stats)?;
        }
    }
    flush(sink, &mut batch, &mut stats)?;

    info!(
        root = %root.display(),
        files = stats.files,
        batches = stats.batches,
        skipped,
        "enumeration complete"
    );
    Ok(stats)
}

/// `path` anchored at the current directory when relative, with `.`
/// components dropped. Symlinks are left as they are.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(anchored.components().collect())
}

fn flush<S: RecordSink + ?Sized>(
    sink: &mut S,
    batch: &mut Vec<FileRecord>,
    stats: &mut EnumerationStats,
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }
    let written = sink.insert_batch(batch)?;
    stats.files += written;
    stats.batches += 1;
    batch.clear();
    Ok(())
}
