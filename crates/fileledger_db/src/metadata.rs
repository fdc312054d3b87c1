//! `metadata` table operations.

use crate::digest::DigestTable;
use crate::error::Result;
use crate::schema::INSERT_METADATA_SQL;
use crate::types::RunMetadata;
use crate::{instrumented, RecordStore};
use rusqlite::params;

impl RecordStore {
    /// Append one run's metadata row. Returns the assigned id.
    pub fn insert_metadata(&mut self, meta: &RunMetadata) -> Result<i64> {
        instrumented("insert_metadata", INSERT_METADATA_SQL, || {
            let tx = self.conn.transaction()?;
            tx.execute(
                INSERT_METADATA_SQL,
                params![
                    meta.signature_md5,
                    meta.challenge,
                    meta.so,
                    meta.architecture,
                    meta.date_db_creation,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })
    }

    /// Every metadata row, oldest first.
    pub fn read_metadata(&self) -> Result<Vec<RunMetadata>> {
        let sql = RunMetadata::select_sql();
        instrumented("read_metadata", &sql, || {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], RunMetadata::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// The most recent metadata row, if any run completed on this store.
    pub fn latest_metadata(&self) -> Result<Option<RunMetadata>> {
        Ok(self.read_metadata()?.pop())
    }
}
