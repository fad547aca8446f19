//! Batch Mutator
//!
//! Validates user-supplied operations and commits them as one atomic batch.

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};
use crate::store::{KvWrite, Operation, WriteBatch};

/// Largest batch accepted in one call
pub const MAX_BATCH_OPS: usize = 10_000;

/// An operation as it arrives from a client: a string tag plus arguments.
///
/// The tag is `"put"` or `"delete"`; `value` is ignored for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpRecord {
    pub op: String,
    pub key: Vec<u8>,
    #[serde(default)]
    pub value: Vec<u8>,
}

impl OpRecord {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            op: "put".to_string(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self {
            op: "delete".to_string(),
            key: key.into(),
            value: Vec::new(),
        }
    }
}

impl TryFrom<&OpRecord> for Operation {
    type Error = KvError;

    fn try_from(record: &OpRecord) -> Result<Self> {
        match record.op.as_str() {
            "put" => Ok(Operation::Put {
                key: record.key.clone(),
                value: record.value.clone(),
            }),
            "delete" => Ok(Operation::Delete {
                key: record.key.clone(),
            }),
            other => Err(KvError::BadBatch(format!("unknown operation {:?}", other))),
        }
    }
}

/// Applies operation lists atomically against a writable store
pub struct BatchMutator<'a, S> {
    store: &'a S,
    max_ops: usize,
}

impl<'a, S: KvWrite> BatchMutator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_ops: MAX_BATCH_OPS,
        }
    }

    /// Override the batch size ceiling
    pub fn with_max_ops(mut self, max_ops: usize) -> Self {
        self.max_ops = max_ops;
        self
    }

    /// Validate and commit `records`, returning how many were applied.
    ///
    /// Checks run in order, and nothing reaches the store unless all pass:
    /// 1. Size ceiling (`Oversize`)
    /// 2. Every tag is put or delete (`BadBatch`)
    /// 3. One atomic commit (engine errors surface unchanged)
    pub fn apply(&self, records: &[OpRecord]) -> Result<usize> {
        if records.len() > self.max_ops {
            tracing::warn!(
                "Rejecting batch of {} operations (max {})",
                records.len(),
                self.max_ops
            );
            return Err(KvError::Oversize {
                count: records.len(),
                max: self.max_ops,
            });
        }

        let mut batch = WriteBatch::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let op = Operation::try_from(record).map_err(|e| {
                tracing::warn!("Rejecting batch: operation {} is invalid: {}", index, e);
                e
            })?;
            batch.push(op);
        }

        let applied = batch.len();
        self.store.write(batch)?;
        tracing::trace!("Committed batch of {} operations", applied);
        Ok(applied)
    }
}
