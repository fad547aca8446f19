//! Tests for WAL Reader
//!
//! These tests verify:
//! - Reading records back in order
//! - Clean end of file
//! - Partial records surface as corruption

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use sortkv::config::WalSyncStrategy;
use sortkv::error::KvError;
use sortkv::store::Operation;
use sortkv::wal::{WalReader, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_wal(count: usize) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    for i in 0..count {
        writer
            .append(vec![Operation::Put {
                key: format!("key{:03}", i).into_bytes(),
                value: format!("value{}", i).into_bytes(),
            }])
            .unwrap();
    }

    (temp_dir, wal_path)
}

// =============================================================================
// Reading Tests
// =============================================================================

#[test]
fn test_read_empty_file() {
    let (_temp, wal_path) = write_wal(0);

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_none());
    assert_eq!(reader.position(), 0);
}

#[test]
fn test_read_in_order() {
    let (_temp, wal_path) = write_wal(10);

    let mut reader = WalReader::open(&wal_path).unwrap();
    let mut expected_lsn = 1;
    while let Some(entry) = reader.next_entry().unwrap() {
        assert_eq!(entry.lsn, expected_lsn);
        assert_eq!(entry.ops[0].key(), format!("key{:03}", expected_lsn - 1).as_bytes());
        expected_lsn += 1;
    }

    assert_eq!(expected_lsn, 11);
    assert_eq!(reader.position(), std::fs::metadata(&wal_path).unwrap().len());
}

#[test]
fn test_iterator_yields_all() {
    let (_temp, wal_path) = write_wal(5);

    let count = WalReader::open(&wal_path)
        .unwrap()
        .entries()
        .filter(|e| e.is_ok())
        .count();
    assert_eq!(count, 5);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = WalReader::open(&temp_dir.path().join("absent.wal"));
    assert!(matches!(result, Err(KvError::Io(_))));
}

// =============================================================================
// Partial Record Tests
// =============================================================================

#[test]
fn test_partial_header_is_corruption() {
    let (_temp, wal_path) = write_wal(2);
    let good_len = std::fs::metadata(&wal_path).unwrap().len();

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0xAB; 5]).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().unwrap().is_some());

    let err = reader.next_entry().unwrap_err();
    assert!(matches!(err, KvError::WalCorruption(_)));
    assert_eq!(reader.position(), good_len);
}

#[test]
fn test_partial_body_is_corruption() {
    let (_temp, wal_path) = write_wal(1);
    let len = std::fs::metadata(&wal_path).unwrap().len();

    let file = OpenOptions::new().write(true).open(&wal_path).unwrap();
    file.set_len(len - 3).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(matches!(reader.next_entry(), Err(KvError::WalCorruption(_))));
}

#[test]
fn test_iterator_stops_after_error() {
    let (_temp, wal_path) = write_wal(3);

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[1, 2, 3]).unwrap();

    let results: Vec<_> = WalReader::open(&wal_path).unwrap().entries().collect();
    assert_eq!(results.len(), 4);
    assert!(results[..3].iter().all(|r| r.is_ok()));
    assert!(results[3].is_err());
}
