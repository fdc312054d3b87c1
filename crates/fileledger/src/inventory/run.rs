//! Run coordinator: enumerate, partition, enrich in parallel, then sign.
//!
//! ```text
//! resolve root ──► privilege check ──► create store ──► enumerate (1 conn)
//!                                                           │
//!                                      count N, close ◄─────┘
//!                                           │
//!                      ┌──────────┬─────────┴────────┐
//!                  worker 1   worker 2   ...   worker W   (own conn each)
//!                      └──────────┴─────────┬────────┘
//!                                      join all
//!                                           │
//!                          digest(data) ──► insert metadata
//! ```

use super::enrich::TIMESTAMP_FORMAT;
use super::enumerate::{absolute_path, enumerate, EnumerationStats};
use super::partition::partition;
use super::progress::{ProgressSink, Spinner};
use super::worker::{EnrichmentWorker, WorkerReport};
use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::host::HostProbe;
use chrono::{Local, Utc};
use fileledger_db::{FileRecord, RecordStore, RunMetadata};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub store_path: PathBuf,
    pub root: PathBuf,
    pub records: u64,
    pub workers: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "duration_secs")]
    pub elapsed: Duration,
    pub signature: String,
    pub unreadable: u64,
    pub enumeration: EnumerationStats,
    pub reports: Vec<WorkerReport>,
}

fn duration_secs<S: Serializer>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

/// Drives one inventory of `root` from empty store to signed store.
pub struct InventoryRun<'a> {
    config: &'a InventoryConfig,
    host: &'a dyn HostProbe,
    progress: &'a dyn ProgressSink,
    show_spinner: bool,
}

impl<'a> InventoryRun<'a> {
    pub fn new(
        config: &'a InventoryConfig,
        host: &'a dyn HostProbe,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            config,
            host,
            progress,
            show_spinner: false,
        }
    }

    /// Show a spinner on stderr while enumerating.
    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    pub fn execute(&self, root: &Path) -> Result<RunSummary> {
        self.config.validate()?;
        let started = Instant::now();
        let started_at = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let root = resolve_root(root, self.config.sub_path.as_deref())?;
        if self.config.require_elevated && !self.host.has_raw_volume_access() {
            return Err(InventoryError::Privilege(
                "raw volume access is required; rerun as administrator or root".to_string(),
            ));
        }

        let store_path = self
            .config
            .output_dir
            .join(format!("{}.sqlite", Utc::now().timestamp()));
        let workers = self.config.effective_workers();
        info!(
            root = %root.display(),
            store = %store_path.display(),
            workers,
            batch_size = self.config.batch_size,
            "starting inventory"
        );

        let mut store = RecordStore::create(&store_path)?;
        let spinner = Spinner::start("Enumerating files...", self.show_spinner);
        let enumerated = enumerate(&root, &mut store, self.config.batch_size);
        spinner.stop();
        let enumeration = enumerated?;
        let records = store.count()?;
        store.close()?;

        self.progress.set_total(records);
        let reports = self.enrich_all(&store_path, records, workers)?;
        let unreadable = reports.iter().map(|r| r.unreadable).sum();

        let mut store = RecordStore::open(&store_path)?;
        let signature = store.digest::<FileRecord>(&self.config.challenge)?;
        store.insert_metadata(&RunMetadata {
            id: 0,
            signature_md5: signature.clone(),
            challenge: self.config.challenge.clone(),
            so: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            date_db_creation: started_at,
        })?;
        store.close()?;

        let elapsed = started.elapsed();
        info!(
            records,
            unreadable,
            duration_ms = elapsed.as_millis() as u64,
            signature = %signature,
            "inventory complete"
        );

        Ok(RunSummary {
            store_path,
            root,
            records,
            workers,
            elapsed,
            signature,
            unreadable,
            enumeration,
            reports,
        })
    }

    fn enrich_all(&self, store_path: &Path, records: u64, workers: usize) -> Result<Vec<WorkerReport>> {
        let ranges = partition(records, workers)?;
        let batch_size = self.config.batch_size;
        let progress = self.progress;

        thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .into_iter()
                .enumerate()
                .map(|(index, range)| {
                    let ordinal = index + 1;
                    let handle = scope.spawn(move || -> Result<WorkerReport> {
                        let store = RecordStore::open(store_path)?;
                        EnrichmentWorker::new(ordinal, range, batch_size, store, progress).run()
                    });
                    (ordinal, handle)
                })
                .collect();

            // Join everything before reporting, so no worker outlives the run.
            let mut reports = Vec::with_capacity(handles.len());
            let mut first_error = None;
            for (ordinal, handle) in handles {
                let outcome = handle.join().unwrap_or_else(|_| {
                    Err(InventoryError::InvalidState(format!(
                        "worker {} panicked",
                        ordinal
                    )))
                });
                match outcome {
                    Ok(report) => reports.push(report),
                    Err(err) => {
                        warn!(worker = ordinal, error = %err, "worker failed");
                        first_error.get_or_insert(err);
                    }
                }
            }
            match first_error {
                Some(err) => Err(err),
                None => Ok(reports),
            }
        })
    }
}

/// Absolute `root` joined with `sub_path`, or the root alone when the join
/// is not a directory.
pub fn resolve_root(root: &Path, sub_path: Option<&Path>) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(InventoryError::RootNotFound(root.display().to_string()));
    }
    let root = absolute_path(root)?;
    let Some(sub_path) = sub_path else {
        return Ok(root);
    };
    let joined = root.join(sub_path);
    if joined.is_dir() {
        Ok(joined)
    } else {
        warn!(
            sub_path = %sub_path.display(),
            root = %root.display(),
            "sub-path is not a directory, inventorying the whole root"
        );
        Ok(root)
    }
}
