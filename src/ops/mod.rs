//! Operations Module
//!
//! The logic built on top of the engine traits in [`crate::store`].
//!
//! - [`range`]: bounded, directional range scans with truncation reporting
//! - [`batch`]: validated, all-or-nothing batch mutation
//! - [`export`]: consistent snapshot export into a new keyspace
//! - [`lookup`]: multi-key point lookups
//!
//! None of these hold state between calls or depend on each other; each
//! call owns its own cursor, batch, or snapshot.

pub mod batch;
pub mod export;
pub mod lookup;
pub mod range;

pub use batch::{BatchMutator, OpRecord, MAX_BATCH_OPS};
pub use export::{ExportStats, SnapshotExporter, EXPORT_CHUNK_SIZE};
pub use lookup::multi_get;
pub use range::{Direction, RangeIterator, ScanRequest, ScanResult, ScanSummary, MAX_SCAN_LIMIT};
