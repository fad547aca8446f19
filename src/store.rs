//! Store Module
//!
//! Engine access conventions shared by the range iterator, the batch
//! mutator, and the snapshot exporter.
//!
//! Every operation built on the engine takes a handle implementing these
//! traits explicitly. Nothing reaches for a process-wide database, so
//! several keyspaces can live side by side and tests can substitute their
//! own stores.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Mutations
// =============================================================================

/// A single mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl Operation {
    /// The key this operation touches
    pub fn key(&self) -> &[u8] {
        match self {
            Operation::Put { key, .. } | Operation::Delete { key } => key,
        }
    }
}

/// An ordered set of mutations committed as one atomic unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<Operation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    /// Queue a put
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(Operation::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Queue a delete
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(Operation::Delete { key: key.into() });
    }

    pub fn push(&mut self, op: Operation) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Operations in commit order
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Operation> {
        self.ops
    }
}

impl From<Vec<Operation>> for WriteBatch {
    fn from(ops: Vec<Operation>) -> Self {
        Self { ops }
    }
}

// =============================================================================
// Engine Traits
// =============================================================================

/// Bidirectional cursor over an ordered keyspace.
///
/// Positioning methods never fail because the cursor ran off an edge; they
/// leave it invalid instead, which `current()` reports as `None`. Errors
/// are reserved for failures of the underlying storage.
pub trait KvCursor {
    /// Position at the smallest key
    fn seek_to_first(&mut self) -> Result<()>;

    /// Position at the largest key
    fn seek_to_last(&mut self) -> Result<()>;

    /// Position at the smallest key >= `target`
    fn seek(&mut self, target: &[u8]) -> Result<()>;

    /// Step to the next larger key
    fn next(&mut self) -> Result<()>;

    /// Step to the next smaller key
    fn prev(&mut self) -> Result<()>;

    /// The key/value pair under the cursor, or `None` when invalid
    fn current(&self) -> Option<(&[u8], &[u8])>;
}

/// Read access: point lookups and cursors
pub trait KvRead {
    type Cursor: KvCursor;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Open a cursor. It starts out invalid; position it before reading.
    fn cursor(&self) -> Result<Self::Cursor>;
}

/// Write access
pub trait KvWrite {
    /// Commit every operation of `batch` or none of them
    fn write(&self, batch: WriteBatch) -> Result<()>;

    /// Make everything committed so far durable
    fn flush(&self) -> Result<()>;
}

/// Point-in-time snapshots
pub trait KvSnapshot {
    type Snapshot: KvRead;

    /// Capture an immutable view; later writes are invisible through it.
    /// Dropping the snapshot releases it.
    fn snapshot(&self) -> Result<Self::Snapshot>;
}
