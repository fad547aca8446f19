//! MemTable implementation
//!
//! Copy-on-write BTreeMap with RwLock for concurrency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::Operation;

/// Immutable view of the table at one point in time
pub type TableView = Arc<BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-memory ordered table
pub struct MemTable {
    data: RwLock<TableView>,
    /// Approximate size in bytes (keys + values)
    size: AtomicUsize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::from_map(BTreeMap::new())
    }

    /// Create a MemTable holding `map` (used when loading a checkpoint)
    pub fn from_map(map: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        let size = map.iter().map(|(k, v)| k.len() + v.len()).sum();
        Self {
            data: RwLock::new(Arc::new(map)),
            size: AtomicUsize::new(size),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Apply a sequence of operations as one unit.
    ///
    /// All operations land under a single write lock, so readers see either
    /// none or all of them.
    ///
    /// With no view outstanding the map is updated in place. While a cursor
    /// or snapshot holds a view, the map is copied first, which costs
    /// O(entries) per apply.
    pub fn apply(&self, ops: &[Operation]) {
        let mut guard = self.data.write();
        let map = Arc::make_mut(&mut *guard);
        let mut size = self.size.load(Ordering::Relaxed);

        for op in ops {
            match op {
                Operation::Put { key, value } => {
                    let added = key.len() + value.len();
                    match map.insert(key.clone(), value.clone()) {
                        Some(old) => size = size - old.len() + value.len(),
                        None => size += added,
                    }
                }
                Operation::Delete { key } => {
                    if let Some(old) = map.remove(key) {
                        size -= key.len() + old.len();
                    }
                }
            }
        }

        self.size.store(size, Ordering::Relaxed);
    }

    /// Current contents as an immutable view (cheap: clones an `Arc`)
    pub fn view(&self) -> TableView {
        Arc::clone(&*self.data.read())
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Get entry count
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
