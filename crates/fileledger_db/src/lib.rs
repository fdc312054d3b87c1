//! Record store for fileledger inventories
//!
//! One SQLite file per run, holding two tables:
//!
//! - `data`: one row per enumerated file, ids dense from 1
//! - `metadata`: one row per completed run, carrying the table signature
//!
//! Every enrichment worker opens its own [`RecordStore`] on the same file.
//! The store does not coordinate writers beyond SQLite's own locking; callers
//! keep their row ranges disjoint.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fileledger_db::{FileRecord, RecordStore};
//!
//! let mut store = RecordStore::create("1700000000.sqlite")?;
//! store.insert_batch(&[FileRecord::placeholder("/etc/hosts")])?;
//!
//! let mut rows = store.read_range(1, 300)?;
//! rows[0].file_name = "hosts".to_string();
//! store.update_batch(&rows)?;
//! ```

mod data;
pub mod digest;
mod error;
mod metadata;
mod schema;
mod types;

pub use digest::{digest_rows, Column, DigestTable, TableDigest, DEFAULT_CHALLENGE};
pub use error::{DbError, Result};
pub use types::{FileRecord, RunMetadata};

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug_span, info};

/// How long a connection waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection to one inventory store.
///
/// Not `Sync`: share the path, not the handle, and open one store per thread.
pub struct RecordStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &"SQLite")
            .field("path", &self.path)
            .finish()
    }
}

impl RecordStore {
    /// Create a fresh store at `path` with both tables.
    ///
    /// Fails if a file already exists there; every run starts from an empty
    /// store.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(DbError::AlreadyExists(format!(
                "Store already exists: {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let store = Self::configure(conn, Some(path.to_path_buf()))?;
        store.ensure_schema()?;

        info!(path = %path.display(), "Store created");
        Ok(store)
    }

    /// Open an existing store (fails if not exists).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DbError::not_found(format!(
                "Store not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::configure(conn, Some(path.to_path_buf()))
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self::configure(conn, None)?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn configure(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL lets the other workers keep reading while one commits.
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        tracing::debug!(journal_mode = %mode, "Store connection configured");
        Ok(Self { conn, path })
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }
}

/// Run `op` inside a debug span carrying the statement kind, a stable hash of
/// the SQL, and the elapsed time.
pub(crate) fn instrumented<T>(
    name: &'static str,
    sql: &str,
    op: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let op_name = sql_op_name(sql);
    let span = if op_name.eq_ignore_ascii_case("SELECT") {
        debug_span!(
            "db.query",
            stmt = name,
            sql_hash = %hash_sql(sql),
            duration_ms = tracing::field::Empty
        )
    } else {
        debug_span!(
            "db.exec",
            stmt = name,
            op = op_name,
            sql_hash = %hash_sql(sql),
            duration_ms = tracing::field::Empty
        )
    };
    let _guard = span.enter();
    let start = Instant::now();
    let result = op();
    span.record("duration_ms", start.elapsed().as_millis() as u64);
    result
}

fn sql_op_name(sql: &str) -> &str {
    sql.split_whitespace().next().unwrap_or("unknown")
}

fn hash_sql(sql: &str) -> String {
    // FNV-1a 64-bit hash for low-cardinality, stable identification.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in sql.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{:016x}", hash)
}
