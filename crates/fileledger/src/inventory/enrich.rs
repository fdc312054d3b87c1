//! Per-file enrichment: stat, timestamps, and content hash.
//!
//! Every failure here is local to one record. A file that vanished or cannot
//! be read keeps empty fields and the run carries on.

use chrono::{DateTime, Local};
use fileledger_db::FileRecord;
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Timestamp layout stored in `date_creation` and `date_last_modification`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOutcome {
    pub stat_ok: bool,
    pub hash_ok: bool,
}

impl EnrichOutcome {
    pub fn is_complete(&self) -> bool {
        self.stat_ok && self.hash_ok
    }
}

/// Populate `record` from the file at `record.full_path`.
pub fn enrich_record(record: &mut FileRecord) -> EnrichOutcome {
    let path = PathBuf::from(&record.full_path);

    let stat_ok = match fs::metadata(&path) {
        Ok(metadata) => {
            apply_metadata(record, &path, &metadata);
            true
        }
        Err(err) => {
            tracing::debug!(path = %record.full_path, error = %err, "stat failed");
            false
        }
    };

    let hash_ok = match hash_file(&path) {
        Ok(hash) => {
            record.hash_md5 = hash;
            true
        }
        Err(err) => {
            tracing::debug!(path = %record.full_path, error = %err, "hash failed");
            false
        }
    };

    EnrichOutcome { stat_ok, hash_ok }
}

fn apply_metadata(record: &mut FileRecord, path: &Path, metadata: &Metadata) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    record.file_extension = extension_of(&name).to_string();
    record.file_name = name;
    record.size_bytes = i64::try_from(metadata.len()).ok();
    record.date_last_modification = metadata
        .modified()
        .map(format_timestamp)
        .unwrap_or_default();
    // Not every platform or filesystem records a birth time.
    record.date_creation = metadata.created().map(format_timestamp).unwrap_or_default();
}

/// Suffix of `name` starting at its last `.`, dot included.
///
/// `report.tar.gz` gives `.gz`, `.bashrc` gives `.bashrc`, `Makefile` gives
/// an empty string.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) => &name[index..],
        None => "",
    }
}

/// Local-time rendering of a filesystem timestamp.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Lowercase hex MD5 of the file's content, streamed in fixed-size chunks.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut ctx = md5::Context::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        ctx.consume(&buffer[..read]);
    }
    Ok(format!("{:x}", ctx.compute()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.tar.gz"), ".gz");
        assert_eq!(extension_of("notes.TXT"), ".TXT");
        assert_eq!(extension_of(".bashrc"), ".bashrc");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of("trailing."), ".");
    }

    #[test]
    fn test_hash_file_matches_known_md5() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, "a").unwrap();
        assert_eq!(hash_file(&path).unwrap(), "0cc175b9c0f1b6a831c399e269772661");
    }

    #[test]
    fn test_hash_file_spans_buffers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.bin");
        let content = vec![7u8; HASH_BUFFER_SIZE * 2 + 13];
        fs::write(&path, &content).unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            format!("{:x}", md5::compute(&content))
        );
    }

    #[test]
    fn test_enrich_populates_every_field() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        let mtime = FileTime::from_unix_time(1_700_000_000, 0);
        set_file_mtime(&path, mtime).unwrap();

        let mut record = FileRecord::placeholder(path.to_string_lossy());
        let outcome = enrich_record(&mut record);

        assert!(outcome.is_complete());
        assert_eq!(record.file_name, "data.csv");
        assert_eq!(record.file_extension, ".csv");
        assert_eq!(record.size_bytes, Some(8));
        assert_eq!(record.hash_md5, format!("{:x}", md5::compute("a,b\n1,2\n")));
        let expected_mtime = format_timestamp(
            SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000),
        );
        assert_eq!(record.date_last_modification, expected_mtime);
    }

    #[test]
    fn test_enrich_missing_file_leaves_fields_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.txt");

        let mut record = FileRecord::placeholder(path.to_string_lossy());
        let outcome = enrich_record(&mut record);

        assert!(!outcome.stat_ok);
        assert!(!outcome.hash_ok);
        assert_eq!(
            record,
            FileRecord::placeholder(path.to_string_lossy()),
            "a vanished file must keep its placeholder fields"
        );
    }

    #[test]
    fn test_format_timestamp_layout() {
        let formatted = format_timestamp(SystemTime::now());
        assert_eq!(formatted.len(), "2024-01-01 00:00:00".len());
        assert_eq!(&formatted[4..5], "-");
        assert_eq!(&formatted[10..11], " ");
    }
}
