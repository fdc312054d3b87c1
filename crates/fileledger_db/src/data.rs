//! `data` table operations: batched insert, range read, batched update,
//! count, and table digest.

use crate::digest::{DigestTable, TableDigest};
use crate::error::{DbError, Result};
use crate::schema::{COUNT_DATA_SQL, INSERT_DATA_SQL, SELECT_DATA_RANGE_SQL, UPDATE_DATA_SQL};
use crate::types::FileRecord;
use crate::{instrumented, RecordStore};
use rusqlite::{params, TransactionBehavior};

impl RecordStore {
    /// Append placeholder records in one transaction.
    ///
    /// Ids are assigned by the store, so `record.id` is ignored. Any row error
    /// rolls back the whole batch. Returns the number of rows inserted.
    pub fn insert_batch(&mut self, records: &[FileRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        instrumented("insert_batch", INSERT_DATA_SQL, || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            {
                let mut stmt = tx.prepare_cached(INSERT_DATA_SQL)?;
                for record in records {
                    stmt.execute(params![
                        record.full_path,
                        record.file_name,
                        record.file_extension,
                        record.hash_md5,
                        record.size_bytes,
                        record.date_creation,
                        record.date_last_modification,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len() as u64)
        })
    }

    /// All records with `lo <= id <= hi`, ordered by id.
    pub fn read_range(&self, lo: i64, hi: i64) -> Result<Vec<FileRecord>> {
        if lo > hi {
            return Ok(Vec::new());
        }

        instrumented("read_range", SELECT_DATA_RANGE_SQL, || {
            let mut stmt = self.conn.prepare_cached(SELECT_DATA_RANGE_SQL)?;
            let rows = stmt
                .query_map(params![lo, hi], FileRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Write every field except `id` back for each record, in one transaction.
    ///
    /// A record whose id has no row is a constraint error and rolls the whole
    /// batch back.
    pub fn update_batch(&mut self, records: &[FileRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        instrumented("update_batch", UPDATE_DATA_SQL, || {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            {
                let mut stmt = tx.prepare_cached(UPDATE_DATA_SQL)?;
                for record in records {
                    let changed = stmt.execute(params![
                        record.full_path,
                        record.file_name,
                        record.file_extension,
                        record.hash_md5,
                        record.size_bytes,
                        record.date_creation,
                        record.date_last_modification,
                        record.id,
                    ])?;
                    if changed == 0 {
                        return Err(DbError::constraint(format!(
                            "No data row with id {}",
                            record.id
                        )));
                    }
                }
            }
            tx.commit()?;
            Ok(records.len() as u64)
        })
    }

    /// Number of rows in `data`.
    pub fn count(&self) -> Result<u64> {
        instrumented("count", COUNT_DATA_SQL, || {
            let count: i64 = self.conn.query_row(COUNT_DATA_SQL, [], |row| row.get(0))?;
            u64::try_from(count)
                .map_err(|_| DbError::invalid_state(format!("Negative row count {}", count)))
        })
    }

    /// Salted digest over every column of every row of table `T`, in id order.
    pub fn digest<T: DigestTable>(&self, salt: &str) -> Result<String> {
        let sql = T::select_sql();
        instrumented("digest", &sql, || {
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            let mut digest = TableDigest::new(salt);
            while let Some(row) = rows.next()? {
                digest.push_row(&T::from_row(row)?);
            }
            tracing::debug!(table = T::TABLE, cells = digest.cells(), "Table digested");
            Ok(digest.finish())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_CHALLENGE;

    fn store_with(paths: &[&str]) -> RecordStore {
        let mut store = RecordStore::open_in_memory().unwrap();
        let records: Vec<_> = paths.iter().map(|p| FileRecord::placeholder(*p)).collect();
        store.insert_batch(&records).unwrap();
        store
    }

    fn enriched(mut record: FileRecord) -> FileRecord {
        record.file_name = "a.txt".to_string();
        record.file_extension = ".txt".to_string();
        record.hash_md5 = "0cc175b9c0f1b6a831c399e269772661".to_string();
        record.size_bytes = Some(1);
        record.date_creation = "2024-01-01 00:00:00".to_string();
        record.date_last_modification = "2024-01-02 00:00:00".to_string();
        record
    }

    #[test]
    fn test_insert_assigns_dense_ids_from_one() {
        let mut store = store_with(&["/a", "/b", "/c"]);
        store
            .insert_batch(&[FileRecord::placeholder("/d"), FileRecord::placeholder("/e")])
            .unwrap();

        let ids: Vec<i64> = store.read_range(1, 100).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn test_insert_then_read_round_trips_fields() {
        let store = store_with(&["/data/report.csv"]);
        let rows = store.read_range(1, 1).unwrap();

        assert_eq!(
            rows,
            vec![FileRecord {
                id: 1,
                ..FileRecord::placeholder("/data/report.csv")
            }]
        );
        assert!(!rows[0].is_enriched());
    }

    #[test]
    fn test_insert_empty_batch_is_noop() {
        let mut store = RecordStore::open_in_memory().unwrap();
        assert_eq!(store.insert_batch(&[]).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_failed_insert_batch_leaves_no_rows_or_id_gap() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON data
                 WHEN NEW.full_path = '/bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let batch = [
            FileRecord::placeholder("/a"),
            FileRecord::placeholder("/b"),
            FileRecord::placeholder("/bad"),
        ];
        assert!(store.insert_batch(&batch).is_err());
        assert_eq!(store.count().unwrap(), 0);

        store.insert_batch(&[FileRecord::placeholder("/c")]).unwrap();
        let rows = store.read_range(1, 100).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].full_path, "/c");
    }

    #[test]
    fn test_read_range_bounds_are_inclusive() {
        let store = store_with(&["/1", "/2", "/3", "/4", "/5"]);
        let rows = store.read_range(2, 4).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_read_range_empty_when_inverted() {
        let store = store_with(&["/1"]);
        assert!(store.read_range(1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_update_preserves_ids() {
        let mut store = store_with(&["/a", "/b"]);
        let rows: Vec<_> = store
            .read_range(1, 2)
            .unwrap()
            .into_iter()
            .map(enriched)
            .collect();
        store.update_batch(&rows).unwrap();

        let after = store.read_range(1, 2).unwrap();
        assert_eq!(after, rows);
        assert_eq!(after.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(after[1].full_path, "/b");
    }

    #[test]
    fn test_update_unknown_id_rolls_back_batch() {
        let mut store = store_with(&["/a"]);
        let good = enriched(store.read_range(1, 1).unwrap().remove(0));
        let missing = FileRecord {
            id: 42,
            ..FileRecord::placeholder("/ghost")
        };

        let err = store.update_batch(&[good, missing]).unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));

        let row = store.read_range(1, 1).unwrap().remove(0);
        assert!(!row.is_enriched(), "first row must be rolled back");
    }

    #[test]
    fn test_digest_is_stable_and_cell_sensitive() {
        let mut store = store_with(&["/a", "/b", "/c"]);
        let first = store.digest::<FileRecord>(DEFAULT_CHALLENGE).unwrap();
        let second = store.digest::<FileRecord>(DEFAULT_CHALLENGE).unwrap();
        assert_eq!(first, second);

        let mut row = store.read_range(2, 2).unwrap().remove(0);
        row.hash_md5 = "x".to_string();
        store.update_batch(&[row]).unwrap();
        assert_ne!(store.digest::<FileRecord>(DEFAULT_CHALLENGE).unwrap(), first);
    }

    #[test]
    fn test_digest_matches_in_memory_rows() {
        let store = store_with(&["/a", "/b"]);
        let rows = store.read_range(1, 2).unwrap();
        assert_eq!(
            store.digest::<FileRecord>("salt").unwrap(),
            crate::digest_rows(&rows, "salt")
        );
    }
}
