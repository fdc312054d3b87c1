//! Row types for the two inventory tables.
//!
//! Each type declares its ordered column list for the table digest. The order
//! here is the order the signature is computed in, so it must match the
//! `CREATE TABLE` statements in `schema.rs`.

use crate::digest::{Column, DigestTable};
use serde::{Deserialize, Serialize};

// ============================================================================
// data
// ============================================================================

/// One enumerated file and its enrichment fields.
///
/// Text fields are empty and `size_bytes` is `None` until a worker enriches the
/// row. A row whose file vanished before enrichment keeps those empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Store-assigned id, dense from 1. Ignored on insert.
    pub id: i64,
    /// Absolute path at discovery time
    pub full_path: String,
    pub file_name: String,
    /// Suffix from the last `.` of the file name, dot included
    pub file_extension: String,
    /// Lowercase hex MD5 of the content, empty when unreadable
    pub hash_md5: String,
    pub size_bytes: Option<i64>,
    pub date_creation: String,
    pub date_last_modification: String,
}

impl FileRecord {
    /// Unenriched placeholder for a freshly discovered path.
    pub fn placeholder(full_path: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            ..Self::default()
        }
    }

    /// Whether a worker managed to stat this file.
    pub fn is_enriched(&self) -> bool {
        self.size_bytes.is_some()
    }
}

impl DigestTable for FileRecord {
    const TABLE: &'static str = "data";

    const COLUMNS: &'static [Column<Self>] = &[
        Column { name: "id", render: |r| r.id.to_string() },
        Column { name: "full_path", render: |r| r.full_path.clone() },
        Column { name: "file_name", render: |r| r.file_name.clone() },
        Column { name: "file_extension", render: |r| r.file_extension.clone() },
        Column { name: "hash_md5", render: |r| r.hash_md5.clone() },
        Column {
            name: "size_bytes",
            render: |r| r.size_bytes.map(|s| s.to_string()).unwrap_or_default(),
        },
        Column { name: "date_creation", render: |r| r.date_creation.clone() },
        Column {
            name: "date_last_modification",
            render: |r| r.date_last_modification.clone(),
        },
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            full_path: row.get(1)?,
            file_name: row.get(2)?,
            file_extension: row.get(3)?,
            hash_md5: row.get(4)?,
            size_bytes: row.get(5)?,
            date_creation: row.get(6)?,
            date_last_modification: row.get(7)?,
        })
    }
}

// ============================================================================
// metadata
// ============================================================================

/// One row per completed run. Written once, after every worker joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Store-assigned id. Ignored on insert.
    pub id: i64,
    /// Digest of the `data` table when enrichment finished
    pub signature_md5: String,
    /// Salt the signature was computed with
    pub challenge: String,
    /// Host operating system
    pub so: String,
    pub architecture: String,
    /// Run start, local time
    pub date_db_creation: String,
}

impl DigestTable for RunMetadata {
    const TABLE: &'static str = "metadata";

    const COLUMNS: &'static [Column<Self>] = &[
        Column { name: "id", render: |r| r.id.to_string() },
        Column { name: "signature_md5", render: |r| r.signature_md5.clone() },
        Column { name: "challenge", render: |r| r.challenge.clone() },
        Column { name: "so", render: |r| r.so.clone() },
        Column { name: "architecture", render: |r| r.architecture.clone() },
        Column { name: "date_db_creation", render: |r| r.date_db_creation.clone() },
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            signature_md5: row.get(1)?,
            challenge: row.get(2)?,
            so: row.get(3)?,
            architecture: row.get(4)?,
            date_db_creation: row.get(5)?,
        })
    }
}
