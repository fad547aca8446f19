//! MemTable Module
//!
//! In-memory ordered table holding the live keyspace.
//!
//! ## Responsibilities
//! - Fast point reads and ordered traversal in memory
//! - Single-writer/multi-reader access pattern
//! - Track approximate size for stats
//! - Hand out immutable views for cursors and snapshots
//!
//! ## Data Structure Choice
//! A `BTreeMap` behind an `Arc`, swapped under a `RwLock`:
//! - Ordered keys give seek/next/prev for cursors
//! - Readers clone the `Arc` and never block the writer afterwards
//! - The writer mutates through `Arc::make_mut`, so a view that is still
//!   held keeps its contents (copy-on-write)

mod cursor;
mod table;

pub use cursor::TableCursor;
pub use table::{MemTable, TableView};
