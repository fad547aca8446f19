//! Storage Module
//!
//! Persistent checkpoints of the whole keyspace in SSTable format.
//!
//! ## Responsibilities
//! - Persist the ordered keyspace to disk as one sorted file
//! - Load the newest checkpoint on startup
//! - Replace checkpoints atomically (temp file + rename)
//! - Remove superseded checkpoint files
//!
//! ## File Format (V1 - Simple)
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header                                 │
//! │ ┌──────────┬──────────┬──────────────┐ │
//! │ │Magic (4) │Version(2)│ Entry Count  │ │
//! │ └──────────┴──────────┴──────────────┘ │
//! ├────────────────────────────────────────┤
//! │ Data Block                             │
//! │ ┌────────┬────────┬─────┬───────────┐ │
//! │ │KeyLen  │ValLen  │ Key │   Value   │ │
//! │ └────────┴────────┴─────┴───────────┘ │
//! │ ... (repeated for each entry)         │
//! ├────────────────────────────────────────┤
//! │ Footer                                 │
//! │ ┌──────────────────┬─────────────────┐ │
//! │ │ Data End Offset  │    CRC32        │ │
//! │ └──────────────────┴─────────────────┘ │
//! └────────────────────────────────────────┘
//! ```

mod manager;
mod sstable;

pub use manager::StorageManager;
pub use sstable::{SSTable, SSTableBuilder, SSTableIterator, SSTableReader};
