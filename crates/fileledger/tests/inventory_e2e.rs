//! End-to-end inventory runs over real temporary trees.

use fileledger::inventory::{
    enumerate, partition, verify, EnrichmentWorker, IdRange, InventoryRun, ProgressReporter,
    WorkerReport,
};
use fileledger::{HostProbe, InventoryConfig, InventoryError};
use fileledger_db::{FileRecord, RecordStore, DEFAULT_CHALLENGE};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

struct FakeProbe {
    raw: bool,
}

impl HostProbe for FakeProbe {
    fn has_raw_volume_access(&self) -> bool {
        self.raw
    }

    fn enumerable_roots(&self) -> fileledger::Result<Vec<PathBuf>> {
        Ok(vec![PathBuf::from("/")])
    }
}

fn build_tree(root: &Path, count: usize) {
    for i in 1..=count {
        let dir = root.join(format!("group{}", i % 3));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("file{}.dat", i)), vec![b'x'; i * 10]).unwrap();
    }
}

fn config_for(output: &Path, workers: usize) -> InventoryConfig {
    InventoryConfig {
        output_dir: output.to_path_buf(),
        workers,
        batch_size: 2,
        ..InventoryConfig::default()
    }
}

#[test]
fn test_seven_records_three_workers_with_vanished_file() {
    let tree = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    build_tree(tree.path(), 7);
    let db = out.path().join("store.sqlite");

    let mut store = RecordStore::create(&db).unwrap();
    enumerate(tree.path(), &mut store, 300).unwrap();
    assert_eq!(store.count().unwrap(), 7);
    let victim = store.read_range(5, 5).unwrap().remove(0);
    fs::remove_file(&victim.full_path).unwrap();
    store.close().unwrap();

    let ranges = partition(7, 3).unwrap();
    assert_eq!(
        ranges,
        vec![IdRange::new(1, 2), IdRange::new(3, 4), IdRange::new(5, 7)]
    );

    let progress = ProgressReporter::hidden();
    let reports: Vec<WorkerReport> = thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(i, &range)| {
                let progress = &progress;
                let db = &db;
                scope.spawn(move || {
                    let store = RecordStore::open(db).unwrap();
                    EnrichmentWorker::new(i + 1, range, 2, store, progress)
                        .run()
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(progress.done(), 7);
    assert_eq!(reports.iter().map(|r| r.processed).sum::<u64>(), 7);
    assert_eq!(reports[2].unreadable, 1);

    let store = RecordStore::open(&db).unwrap();
    assert_eq!(store.count().unwrap(), 7);
    for record in store.read_range(1, 7).unwrap() {
        if record.id == 5 {
            assert_eq!(record.hash_md5, "");
            assert_eq!(record.size_bytes, None);
            assert_eq!(record.full_path, victim.full_path);
        } else {
            assert_eq!(record.hash_md5.len(), 32, "record {} hash", record.id);
            assert!(record.size_bytes.is_some(), "record {} size", record.id);
            assert_eq!(record.file_extension, ".dat");
        }
    }
}

#[test]
fn test_full_run_seals_and_verifies() {
    let tree = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    build_tree(tree.path(), 25);

    let config = config_for(out.path(), 3);
    let progress = ProgressReporter::hidden();
    let probe = FakeProbe { raw: false };
    let summary = InventoryRun::new(&config, &probe, &progress)
        .execute(tree.path())
        .unwrap();

    assert_eq!(summary.records, 25);
    assert_eq!(summary.unreadable, 0);
    assert_eq!(summary.reports.len(), summary.workers);
    assert_eq!(progress.done(), 25);
    assert_eq!(progress.total(), 25);
    assert!(summary.store_path.starts_with(out.path()));
    assert_eq!(
        summary.store_path.extension().and_then(|e| e.to_str()),
        Some("sqlite")
    );

    let store = RecordStore::open(&summary.store_path).unwrap();
    let meta = store.latest_metadata().unwrap().unwrap();
    assert_eq!(meta.signature_md5, summary.signature);
    assert_eq!(meta.challenge, DEFAULT_CHALLENGE);
    assert_eq!(meta.so, std::env::consts::OS);
    assert_eq!(meta.architecture, std::env::consts::ARCH);
    assert!(store
        .read_range(1, 25)
        .unwrap()
        .iter()
        .all(FileRecord::is_enriched));
    store.close().unwrap();

    let report = verify(&summary.store_path).unwrap();
    assert!(report.matches);

    let mut store = RecordStore::open(&summary.store_path).unwrap();
    let mut row = store.read_range(7, 7).unwrap().remove(0);
    row.size_bytes = Some(row.size_bytes.unwrap_or(0) + 1);
    store.update_batch(&[row]).unwrap();
    store.close().unwrap();

    let report = verify(&summary.store_path).unwrap();
    assert!(!report.matches);
    assert_eq!(report.expected, summary.signature);
}

#[test]
fn test_require_elevated_without_access_fails_before_writing() {
    let tree = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    build_tree(tree.path(), 3);

    let config = InventoryConfig {
        require_elevated: true,
        ..config_for(out.path(), 1)
    };
    let progress = ProgressReporter::hidden();
    let err = InventoryRun::new(&config, &FakeProbe { raw: false }, &progress)
        .execute(tree.path())
        .unwrap_err();

    assert!(matches!(err, InventoryError::Privilege(_)));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_require_elevated_with_access_runs() {
    let tree = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    build_tree(tree.path(), 3);

    let config = InventoryConfig {
        require_elevated: true,
        ..config_for(out.path(), 1)
    };
    let progress = ProgressReporter::hidden();
    let summary = InventoryRun::new(&config, &FakeProbe { raw: true }, &progress)
        .execute(tree.path())
        .unwrap();
    assert_eq!(summary.records, 3);
}

#[test]
fn test_sub_path_narrows_and_invalid_sub_path_falls_back() {
    let tree = TempDir::new().unwrap();
    build_tree(tree.path(), 9);
    let probe = FakeProbe { raw: false };

    let out = TempDir::new().unwrap();
    let config = InventoryConfig {
        sub_path: Some(PathBuf::from("group1")),
        ..config_for(out.path(), 2)
    };
    let progress = ProgressReporter::hidden();
    let narrowed = InventoryRun::new(&config, &probe, &progress)
        .execute(tree.path())
        .unwrap();
    assert_eq!(narrowed.records, 3);
    assert_eq!(narrowed.root, tree.path().join("group1"));

    let out = TempDir::new().unwrap();
    let config = InventoryConfig {
        sub_path: Some(PathBuf::from("no/such/dir")),
        ..config_for(out.path(), 2)
    };
    let progress = ProgressReporter::hidden();
    let whole = InventoryRun::new(&config, &probe, &progress)
        .execute(tree.path())
        .unwrap();
    assert_eq!(whole.records, 9);
    assert_eq!(whole.root, tree.path());
}

#[test]
fn test_empty_root_produces_signed_empty_store() {
    let tree = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let progress = ProgressReporter::hidden();

    let summary = InventoryRun::new(&config_for(out.path(), 4), &FakeProbe { raw: false }, &progress)
        .execute(tree.path())
        .unwrap();

    assert_eq!(summary.records, 0);
    // md5 of an empty buffer
    assert_eq!(summary.signature, "d41d8cd98f00b204e9800998ecf8427e");
    assert!(verify(&summary.store_path).unwrap().matches);
}

#[test]
fn test_missing_root_is_fatal() {
    let out = TempDir::new().unwrap();
    let progress = ProgressReporter::hidden();
    let err = InventoryRun::new(&config_for(out.path(), 1), &FakeProbe { raw: false }, &progress)
        .execute(&out.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, InventoryError::RootNotFound(_)));
}
