//! Enrichment worker: owns one id range and one store connection.
//!
//! The worker walks its range in sub-batches of `batch_size` ids. For each
//! sub-batch it reads the placeholders, enriches them, and writes them back
//! in a single transaction. It advances by the span of ids it asked for, not
//! by how many rows came back, so a short read never skips or repeats ids.

use super::enrich::enrich_record;
use super::partition::IdRange;
use super::progress::ProgressSink;
use crate::error::Result;
use fileledger_db::RecordStore;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// What one worker did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    /// 1-based worker ordinal
    pub worker: usize,
    pub range: IdRange,
    /// Records written back, enriched or not
    pub processed: u64,
    /// Records whose file could not be stat'ed or hashed
    pub unreadable: u64,
}

pub struct EnrichmentWorker<'a> {
    ordinal: usize,
    range: IdRange,
    batch_size: usize,
    store: RecordStore,
    progress: &'a dyn ProgressSink,
}

impl<'a> EnrichmentWorker<'a> {
    pub fn new(
        ordinal: usize,
        range: IdRange,
        batch_size: usize,
        store: RecordStore,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            ordinal,
            range,
            batch_size: batch_size.max(1),
            store,
            progress,
        }
    }

    /// Enrich every record in the range. Store errors end the worker; file
    /// errors only leave that record's fields empty.
    pub fn run(mut self) -> Result<WorkerReport> {
        let span = info_span!(
            "worker",
            worker = self.ordinal,
            lo = self.range.lo,
            hi = self.range.hi
        );
        let _guard = span.enter();
        let started = Instant::now();

        let mut report = WorkerReport {
            worker: self.ordinal,
            range: self.range,
            processed: 0,
            unreadable: 0,
        };

        for batch in self.range.batches(self.batch_size) {
            let mut records = self.store.read_range(batch.lo, batch.hi)?;
            for record in &mut records {
                if !enrich_record(record).is_complete() {
                    report.unreadable += 1;
                }
                self.progress.inc(1);
            }
            report.processed += self.store.update_batch(&records)?;
            debug!(lo = batch.lo, hi = batch.hi, records = records.len(), "batch written");
        }

        self.store.close()?;
        info!(
            processed = report.processed,
            unreadable = report.unreadable,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worker finished"
        );
        Ok(report)
    }
}
