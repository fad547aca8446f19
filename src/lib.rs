//! # SortKV
//!
//! An embedded sorted key-value store with:
//! - Write-Ahead Logging (WAL) with one record per atomic batch
//! - Crash recovery with partial write handling
//! - Cursors and point-in-time snapshots over a copy-on-write keyspace
//! - Bounded, directional range scans with truncation reporting
//! - All-or-nothing batch mutation
//! - Consistent snapshot export into a new keyspace
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 TCP Server / Service                         │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │   ops: RangeIterator · BatchMutator · SnapshotExporter       │
//! │          (generic over the store traits)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │  MemTable   │
//!   │  (Append)   │          │ (CoW view)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Storage   │
//!                           │  (SSTable)  │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod store;

pub mod engine;
pub mod memtable;
pub mod storage;
pub mod wal;

pub mod ops;

pub mod network;
pub mod protocol;
pub mod service;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, WalSyncStrategy};
pub use engine::{Engine, Snapshot};
pub use error::{KvError, Result};
pub use ops::{
    BatchMutator, Direction, OpRecord, RangeIterator, ScanRequest, ScanResult, SnapshotExporter,
};
pub use store::{KvCursor, KvRead, KvSnapshot, KvWrite, Operation, WriteBatch};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SortKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
