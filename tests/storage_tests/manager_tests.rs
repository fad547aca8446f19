//! Tests for Storage Manager
//!
//! These tests verify:
//! - Checkpoint write and reload
//! - Superseded checkpoints are removed
//! - Stale temp files are cleaned up on open
//! - ID sequencing across reopen

use std::collections::BTreeMap;
use std::fs;

use sortkv::storage::StorageManager;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn table(count: usize) -> BTreeMap<Vec<u8>, Vec<u8>> {
    (0..count)
        .map(|i| (format!("key{:04}", i).into_bytes(), format!("v{}", i).into_bytes()))
        .collect()
}

fn sst_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_open_empty_dir() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StorageManager::open(temp_dir.path()).unwrap();

    assert_eq!(manager.sstable_count(), 0);
    assert!(manager.current().is_none());
    assert!(manager.load().unwrap().is_empty());
    assert_eq!(manager.next_sstable_id(), 1);
}

#[test]
fn test_checkpoint_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let data = table(50);

    {
        let manager = StorageManager::open(temp_dir.path()).unwrap();
        let sstable = manager.checkpoint(&data).unwrap();
        assert_eq!(sstable.entry_count, 50);
        assert_eq!(sstable.file_name(), "sstable_000001.sst");
    }

    let manager = StorageManager::open(temp_dir.path()).unwrap();
    assert_eq!(manager.load().unwrap(), data);

    let current = manager.current().unwrap();
    assert_eq!(current.min_key, b"key0000");
    assert_eq!(current.max_key, b"key0049");
}

#[test]
fn test_checkpoint_replaces_previous() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StorageManager::open(temp_dir.path()).unwrap();

    manager.checkpoint(&table(10)).unwrap();
    manager.checkpoint(&table(20)).unwrap();

    assert_eq!(sst_files(temp_dir.path()), vec!["sstable_000002.sst"]);
    assert_eq!(manager.sstable_count(), 1);
    assert_eq!(manager.load().unwrap().len(), 20);
}

#[test]
fn test_open_removes_stale_files() {
    let temp_dir = TempDir::new().unwrap();

    {
        let manager = StorageManager::open(temp_dir.path()).unwrap();
        manager.checkpoint(&table(5)).unwrap();
    }

    // An interrupted checkpoint and a leftover older file
    fs::write(temp_dir.path().join("sstable_000009.sst.tmp"), b"partial").unwrap();
    fs::copy(
        temp_dir.path().join("sstable_000001.sst"),
        temp_dir.path().join("sstable_000000.sst"),
    )
    .unwrap();

    let manager = StorageManager::open(temp_dir.path()).unwrap();
    assert_eq!(sst_files(temp_dir.path()), vec!["sstable_000001.sst"]);
    assert_eq!(manager.next_sstable_id(), 2);
    assert_eq!(manager.load().unwrap().len(), 5);
}

#[test]
fn test_open_fails_on_corrupt_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("sstable_000003.sst"), vec![0u8; 64]).unwrap();

    assert!(StorageManager::open(temp_dir.path()).is_err());
}
