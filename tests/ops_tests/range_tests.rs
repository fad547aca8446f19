//! Tests for RangeIterator
//!
//! These tests verify:
//! - Start/end bounds with inclusion flags in both directions
//! - Limit clamping and truncation reporting
//! - Streaming emission with early stop
//! - Cursor failures abort the scan

use std::ops::Bound::{self, Excluded, Included, Unbounded};
use std::ops::ControlFlow;

use sortkv::config::Config;
use sortkv::engine::Engine;
use sortkv::error::{KvError, Result};
use sortkv::ops::{Direction, RangeIterator, ScanRequest, MAX_SCAN_LIMIT};
use sortkv::store::{KvCursor, KvRead};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Engine holding {a:A, b:B, c:C, d:D}
fn setup_abcd() -> (TempDir, Engine) {
    setup_with(&["a", "b", "c", "d"])
}

fn setup_with(keys: &[&str]) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(Config::builder().data_dir(temp_dir.path()).build()).unwrap();
    for key in keys {
        engine
            .put(key.as_bytes(), key.to_uppercase().as_bytes())
            .unwrap();
    }
    (temp_dir, engine)
}

fn inc(key: &str) -> Bound<Vec<u8>> {
    Included(key.as_bytes().to_vec())
}

fn exc(key: &str) -> Bound<Vec<u8>> {
    Excluded(key.as_bytes().to_vec())
}

fn scan<S: KvRead>(
    store: &S,
    start: Bound<Vec<u8>>,
    end: Bound<Vec<u8>>,
    direction: Direction,
    limit: usize,
) -> (Vec<String>, bool) {
    let result = RangeIterator::new(store)
        .scan(&ScanRequest::new(start, end, direction, limit))
        .unwrap();
    let keys = result
        .items
        .iter()
        .map(|(k, _)| String::from_utf8(k.clone()).unwrap())
        .collect();
    (keys, result.truncated)
}

// =============================================================================
// Reference Scenarios
// =============================================================================

#[test]
fn test_forward_inclusive_start_exclusive_end() {
    let (_temp, engine) = setup_abcd();

    let result = RangeIterator::new(&engine)
        .scan(&ScanRequest::new(inc("b"), exc("d"), Direction::Forward, 1000))
        .unwrap();

    assert_eq!(
        result.items,
        vec![
            (b"b".to_vec(), b"B".to_vec()),
            (b"c".to_vec(), b"C".to_vec()),
        ]
    );
    assert!(!result.truncated);
}

#[test]
fn test_backward_unbounded_with_limit() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, Unbounded, Direction::Backward, 2);

    assert_eq!(keys, vec!["d", "c"]);
    assert!(!truncated);
}

#[test]
fn test_limit_before_inclusive_end_is_truncation() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, inc("a"), inc("d"), Direction::Forward, 3);

    assert_eq!(keys, vec!["a", "b", "c"]);
    assert!(truncated);
}

// =============================================================================
// Start Bound Tests
// =============================================================================

#[test]
fn test_forward_exclusive_start_skips_match() {
    let (_temp, engine) = setup_abcd();

    let (keys, _) = scan(&engine, exc("b"), Unbounded, Direction::Forward, 10);
    assert_eq!(keys, vec!["c", "d"]);
}

#[test]
fn test_forward_start_between_keys() {
    let (_temp, engine) = setup_with(&["a", "c", "e"]);

    let (keys, _) = scan(&engine, exc("b"), Unbounded, Direction::Forward, 10);
    assert_eq!(keys, vec!["c", "e"]);
}

#[test]
fn test_backward_exclusive_start() {
    let (_temp, engine) = setup_abcd();

    let (keys, _) = scan(&engine, exc("c"), Unbounded, Direction::Backward, 10);
    assert_eq!(keys, vec!["b", "a"]);
}

#[test]
fn test_backward_inclusive_start() {
    let (_temp, engine) = setup_abcd();

    let (keys, _) = scan(&engine, inc("c"), Unbounded, Direction::Backward, 10);
    assert_eq!(keys, vec!["c", "b", "a"]);
}

#[test]
fn test_backward_start_between_keys() {
    let (_temp, engine) = setup_with(&["a", "c", "e"]);

    let (keys, _) = scan(&engine, inc("d"), Unbounded, Direction::Backward, 10);
    assert_eq!(keys, vec!["c", "a"]);

    let (keys, _) = scan(&engine, exc("d"), Unbounded, Direction::Backward, 10);
    assert_eq!(keys, vec!["c", "a"]);
}

#[test]
fn test_backward_start_past_last_key() {
    let (_temp, engine) = setup_abcd();

    let (keys, _) = scan(&engine, inc("zzz"), Unbounded, Direction::Backward, 10);
    assert_eq!(keys, vec!["d", "c", "b", "a"]);
}

#[test]
fn test_backward_start_before_first_key() {
    let (_temp, engine) = setup_with(&["m", "n"]);

    let (keys, _) = scan(&engine, inc("a"), Unbounded, Direction::Backward, 10);
    assert!(keys.is_empty());
}

#[test]
fn test_forward_start_past_last_key() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, inc("e"), inc("z"), Direction::Forward, 10);
    assert!(keys.is_empty());
    assert!(!truncated);
}

// =============================================================================
// End Bound Tests
// =============================================================================

#[test]
fn test_forward_inclusive_end() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, inc("c"), Direction::Forward, 10);
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert!(!truncated);
}

#[test]
fn test_forward_end_between_keys() {
    let (_temp, engine) = setup_with(&["a", "c", "e"]);

    let (keys, _) = scan(&engine, Unbounded, inc("d"), Direction::Forward, 10);
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn test_backward_end_bounds() {
    let (_temp, engine) = setup_abcd();

    let (keys, _) = scan(&engine, Unbounded, exc("b"), Direction::Backward, 10);
    assert_eq!(keys, vec!["d", "c"]);

    let (keys, _) = scan(&engine, Unbounded, inc("b"), Direction::Backward, 10);
    assert_eq!(keys, vec!["d", "c", "b"]);
}

#[test]
fn test_start_past_end_yields_nothing() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, inc("c"), inc("b"), Direction::Forward, 10);
    assert!(keys.is_empty());
    assert!(!truncated);
}

#[test]
fn test_start_equals_exclusive_end() {
    let (_temp, engine) = setup_abcd();

    let (keys, _) = scan(&engine, inc("b"), exc("b"), Direction::Forward, 10);
    assert!(keys.is_empty());

    let (keys, _) = scan(&engine, inc("b"), inc("b"), Direction::Forward, 10);
    assert_eq!(keys, vec!["b"]);
}

// =============================================================================
// Limit and Truncation Tests
// =============================================================================

#[test]
fn test_no_end_bound_never_truncates() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, Unbounded, Direction::Forward, 2);
    assert_eq!(keys, vec!["a", "b"]);
    assert!(!truncated);
}

#[test]
fn test_limit_landing_on_exclusive_end_is_not_truncation() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, exc("c"), Direction::Forward, 2);
    assert_eq!(keys, vec!["a", "b"]);
    assert!(!truncated);
}

#[test]
fn test_limit_landing_on_inclusive_end_is_truncation() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, inc("c"), Direction::Forward, 2);
    assert_eq!(keys, vec!["a", "b"]);
    assert!(truncated);
}

#[test]
fn test_limit_exactly_reaching_end_is_not_truncation() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, inc("c"), Direction::Forward, 3);
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert!(!truncated);
}

#[test]
fn test_limit_at_keyspace_end_is_not_truncation() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, inc("z"), Direction::Forward, 4);
    assert_eq!(keys.len(), 4);
    assert!(!truncated);
}

#[test]
fn test_backward_truncation() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, inc("a"), Direction::Backward, 2);
    assert_eq!(keys, vec!["d", "c"]);
    assert!(truncated);
}

#[test]
fn test_zero_limit() {
    let (_temp, engine) = setup_abcd();

    let (keys, truncated) = scan(&engine, Unbounded, inc("d"), Direction::Forward, 0);
    assert!(keys.is_empty());
    assert!(truncated);
}

#[test]
fn test_limit_is_clamped() {
    let request = ScanRequest::new(Unbounded, Unbounded, Direction::Forward, 5000);
    assert_eq!(request.limit(), MAX_SCAN_LIMIT);
    assert_eq!(ScanRequest::all().with_limit(usize::MAX).limit(), MAX_SCAN_LIMIT);

    let keys: Vec<String> = (0..1200).map(|i| format!("k{:05}", i)).collect();
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let (_temp, engine) = setup_with(&refs);

    let (found, truncated) = scan(&engine, Unbounded, inc("k99999"), Direction::Forward, 5000);
    assert_eq!(found.len(), MAX_SCAN_LIMIT);
    assert!(truncated);
}

#[test]
fn test_empty_keyspace() {
    let (_temp, engine) = setup_with(&[]);

    for direction in [Direction::Forward, Direction::Backward] {
        let (keys, truncated) = scan(&engine, Unbounded, inc("x"), direction, 10);
        assert!(keys.is_empty());
        assert!(!truncated);
    }
}

#[test]
fn test_scan_reads_a_single_view() {
    let (_temp, engine) = setup_abcd();

    let mut seen = Vec::new();
    RangeIterator::new(&engine)
        .scan_with(&ScanRequest::all(), |key, _| {
            // Writes during the scan are invisible to it
            engine.put(b"bb", b"late").unwrap();
            seen.push(key.to_vec());
            ControlFlow::Continue(())
        })
        .unwrap();

    assert_eq!(seen.len(), 4);
    assert_eq!(engine.get(b"bb").unwrap(), Some(b"late".to_vec()));
}

// =============================================================================
// Streaming Tests
// =============================================================================

#[test]
fn test_emit_break_stops_without_truncation() {
    let (_temp, engine) = setup_abcd();

    let mut seen = 0;
    let summary = RangeIterator::new(&engine)
        .scan_with(&ScanRequest::all().with_end(inc("d")), |_, _| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

    assert_eq!(summary.emitted, 2);
    assert!(!summary.truncated);
}

// =============================================================================
// Failure Tests
// =============================================================================

/// Store whose cursor fails after a number of steps
struct FailingStore {
    keys: Vec<Vec<u8>>,
    fail_after: usize,
}

struct FailingCursor {
    keys: Vec<Vec<u8>>,
    index: Option<usize>,
    steps_left: usize,
}

impl KvCursor for FailingCursor {
    fn seek_to_first(&mut self) -> Result<()> {
        self.index = if self.keys.is_empty() { None } else { Some(0) };
        Ok(())
    }

    fn seek_to_last(&mut self) -> Result<()> {
        self.index = self.keys.len().checked_sub(1);
        Ok(())
    }

    fn seek(&mut self, target: &[u8]) -> Result<()> {
        self.index = self.keys.iter().position(|k| k.as_slice() >= target);
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        if self.steps_left == 0 {
            return Err(KvError::Storage("disk went away".to_string()));
        }
        self.steps_left -= 1;
        self.index = self
            .index
            .map(|i| i + 1)
            .filter(|&i| i < self.keys.len());
        Ok(())
    }

    fn prev(&mut self) -> Result<()> {
        if self.steps_left == 0 {
            return Err(KvError::Storage("disk went away".to_string()));
        }
        self.steps_left -= 1;
        self.index = self.index.and_then(|i| i.checked_sub(1));
        Ok(())
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.index
            .map(|i| (self.keys[i].as_slice(), self.keys[i].as_slice()))
    }
}

impl KvRead for FailingStore {
    type Cursor = FailingCursor;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.keys.iter().find(|k| k.as_slice() == key).cloned())
    }

    fn cursor(&self) -> Result<FailingCursor> {
        Ok(FailingCursor {
            keys: self.keys.clone(),
            index: None,
            steps_left: self.fail_after,
        })
    }
}

#[test]
fn test_cursor_error_aborts_scan() {
    let store = FailingStore {
        keys: vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
        fail_after: 1,
    };

    let mut seen = Vec::new();
    let result = RangeIterator::new(&store).scan_with(&ScanRequest::all(), |key, _| {
        seen.push(key.to_vec());
        ControlFlow::Continue(())
    });

    assert!(matches!(result, Err(KvError::Storage(_))));
    assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    assert!(RangeIterator::new(&store).scan(&ScanRequest::all()).is_err());
}

#[test]
fn test_generic_store_matches_engine_semantics() {
    let store = FailingStore {
        keys: vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()],
        fail_after: usize::MAX,
    };

    let (keys, truncated) = scan(&store, inc("a"), inc("d"), Direction::Forward, 3);
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert!(truncated);
}
