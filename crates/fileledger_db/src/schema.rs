//! Schema creation for the inventory tables.
//!
//! All CREATE TABLE statements live here. Column order must match the
//! `COLUMNS` declarations in `types.rs`.

use crate::error::Result;
use crate::RecordStore;
use tracing::debug;

/// Run metadata: one row per completed run.
const METADATA_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    signature_md5 TEXT NOT NULL DEFAULT '',
    challenge TEXT NOT NULL DEFAULT '',
    so TEXT NOT NULL DEFAULT '',
    architecture TEXT NOT NULL DEFAULT '',
    date_db_creation TEXT NOT NULL DEFAULT ''
);
"#;

/// Files: one row per enumerated file. AUTOINCREMENT keeps ids dense from 1
/// within a fresh store because failed insert batches roll back the sequence.
const DATA_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_path TEXT NOT NULL,
    file_name TEXT NOT NULL DEFAULT '',
    file_extension TEXT NOT NULL DEFAULT '',
    hash_md5 TEXT NOT NULL DEFAULT '',
    size_bytes INTEGER,
    date_creation TEXT NOT NULL DEFAULT '',
    date_last_modification TEXT NOT NULL DEFAULT ''
);
"#;

pub(crate) const INSERT_DATA_SQL: &str = "INSERT INTO data \
    (full_path, file_name, file_extension, hash_md5, size_bytes, date_creation, date_last_modification) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

pub(crate) const UPDATE_DATA_SQL: &str = "UPDATE data SET \
    full_path = ?1, file_name = ?2, file_extension = ?3, hash_md5 = ?4, \
    size_bytes = ?5, date_creation = ?6, date_last_modification = ?7 \
    WHERE id = ?8";

pub(crate) const SELECT_DATA_RANGE_SQL: &str = "SELECT \
    id, full_path, file_name, file_extension, hash_md5, size_bytes, date_creation, date_last_modification \
    FROM data WHERE id >= ?1 AND id <= ?2 ORDER BY id";

pub(crate) const COUNT_DATA_SQL: &str = "SELECT COUNT(*) FROM data";

pub(crate) const INSERT_METADATA_SQL: &str = "INSERT INTO metadata \
    (signature_md5, challenge, so, architecture, date_db_creation) \
    VALUES (?1, ?2, ?3, ?4, ?5)";

impl RecordStore {
    /// Ensure both tables exist.
    pub(crate) fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(METADATA_TABLE_SQL)?;
        self.conn.execute_batch(DATA_TABLE_SQL)?;
        debug!("Inventory schema verified");
        Ok(())
    }
}
