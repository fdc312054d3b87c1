//! The inventory pipeline.
//!
//! A run enumerates one root into a fresh store, splits the id space across
//! workers that enrich their ranges in parallel, and seals the result with a
//! salted digest of the `data` table.

pub mod enrich;
pub mod enumerate;
pub mod partition;
pub mod progress;
pub mod run;
pub mod verify;
pub mod worker;

pub use enumerate::{enumerate, EnumerationStats, RecordSink};
pub use partition::{partition, range_for, IdRange};
pub use progress::{ProgressReporter, ProgressSink, Spinner};
pub use run::{resolve_root, InventoryRun, RunSummary};
pub use verify::{verify, VerifyReport};
pub use worker::{EnrichmentWorker, WorkerReport};
