//! Engine Module
//!
//! The embedded sorted key-value engine that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and Storage
//! - Commit batches atomically
//! - Hand out cursors and point-in-time snapshots
//! - Checkpoint the keyspace when the WAL grows past its limit
//! - Manage crash recovery on startup

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::memtable::{MemTable, TableCursor, TableView};
use crate::storage::StorageManager;
use crate::store::{KvRead, KvSnapshot, KvWrite, Operation, WriteBatch};
use crate::wal::{WalRecovery, WalWriter};

/// Property names answered by [`Engine::property`]
pub const PROPERTY_NAMES: &[&str] = &[
    "sortkv.num-entries",
    "sortkv.approximate-bytes",
    "sortkv.wal-bytes",
    "sortkv.last-sequence",
    "sortkv.sstables",
    "sortkv.stats",
];

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (write/put/delete/flush): Serialized by the `wal` mutex
///   - Only ONE write operation at a time
///   - Order: WAL record → memtable → (maybe) checkpoint
///
/// - **Reads** (get/cursor/snapshot): Concurrent
///   - A short read lock on the memtable, then lock-free
///   - Cursors and snapshots hold their own immutable view
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Write-ahead log; its mutex is the writer lock
    wal: Mutex<WalWriter>,

    /// The live keyspace
    memtable: MemTable,

    /// Checkpoint files
    storage: StorageManager,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const SSTABLE_DIR: &'static str = "sstables";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Load the newest checkpoint
    /// 3. Replay the WAL on top of it
    /// 4. Checkpoint replayed batches and truncate the WAL
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        Self::open_dir(config)
    }

    /// Create a brand-new engine; fails if anything exists at `data_dir`
    pub fn create(config: Config) -> Result<Self> {
        config.validate()?;
        if let Some(parent) = config.data_dir.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::create_dir(&config.data_dir).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => KvError::AlreadyExists(config.data_dir.clone()),
            _ => KvError::Io(e),
        })?;
        Self::open_dir(config)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    fn open_dir(config: Config) -> Result<Self> {
        let storage_dir = config.data_dir.join(Self::SSTABLE_DIR);
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let storage = StorageManager::open(&storage_dir)?;
        let memtable = MemTable::from_map(storage.load()?);

        let mut next_lsn = 1;
        let mut replayed = 0u64;
        if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;

            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                tracing::info!(
                    "WAL recovery: {} batches recovered, {} corrupted, last_lsn={}",
                    recovery.entries_recovered,
                    recovery.entries_corrupted,
                    recovery.last_lsn
                );
            }

            for entry in &entries {
                memtable.apply(&entry.ops);
            }
            replayed = recovery.entries_recovered;
            next_lsn = recovery.last_lsn + 1;
        }

        let mut wal = WalWriter::open_at(&wal_path, config.wal_sync_strategy, next_lsn)?;

        // Recovered batches become durable in a checkpoint before the WAL
        // that carried them is discarded
        if replayed > 0 {
            let table = storage.checkpoint(&memtable.view())?;
            tracing::info!(
                "Checkpointed {} recovered entries to {}",
                table.entry_count,
                table.file_name()
            );
            wal.truncate()?;
        }

        tracing::debug!(
            "Opened keyspace at {} ({} entries)",
            config.data_dir.display(),
            memtable.entry_count()
        );

        Ok(Self {
            config,
            wal: Mutex::new(wal),
            memtable,
            storage,
        })
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.memtable.get(key))
    }

    /// Put a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.commit(vec![Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        }])
    }

    /// Delete a key (deleting a missing key succeeds)
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.commit(vec![Operation::Delete { key: key.to_vec() }])
    }

    /// Commit operations atomically
    ///
    /// Steps:
    /// 1. Acquire the writer lock
    /// 2. Log the whole batch as one WAL record (durability)
    /// 3. Apply it to the memtable under one write lock (visibility)
    /// 4. Checkpoint if the WAL outgrew its limit
    ///
    /// Once step 3 is done the batch is committed. A failed checkpoint in
    /// step 4 is logged and leaves the WAL in place, so the next write
    /// retries it; it never fails the commit.
    fn commit(&self, ops: Vec<Operation>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut wal = self.wal.lock();

        // The WAL keeps its own copy; the memtable applies from ours
        wal.append(ops.clone())?;
        self.memtable.apply(&ops);

        if wal.size() >= self.config.checkpoint_bytes {
            if let Err(e) = self.checkpoint_locked(&mut wal) {
                tracing::warn!(
                    "Checkpoint after commit failed, keeping {} WAL bytes: {}",
                    wal.size(),
                    e
                );
            }
        }

        Ok(())
    }

    /// Internal checkpoint (called with the writer lock held)
    fn checkpoint_locked(&self, wal: &mut WalWriter) -> Result<()> {
        let table = self.storage.checkpoint(&self.memtable.view())?;
        wal.truncate()?;
        tracing::debug!(
            "Checkpoint {}: {} entries, {} bytes",
            table.file_name(),
            table.entry_count,
            table.file_size
        );
        Ok(())
    }

    /// Force a checkpoint regardless of WAL size
    pub fn checkpoint(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        self.checkpoint_locked(&mut wal)
    }

    /// Close the engine gracefully
    ///
    /// Checkpoints any logged batches and syncs to disk
    pub fn close(self) -> Result<()> {
        let mut wal = self.wal.lock();
        if wal.size() > 0 {
            self.checkpoint_locked(&mut wal)?;
        }
        wal.sync()
    }

    /// Look up an engine property; `None` for unknown names
    pub fn property(&self, name: &str) -> Option<String> {
        match name {
            "sortkv.num-entries" => Some(self.memtable.entry_count().to_string()),
            "sortkv.approximate-bytes" => Some(self.memtable.size().to_string()),
            "sortkv.wal-bytes" => Some(self.wal.lock().size().to_string()),
            "sortkv.last-sequence" => {
                Some(self.wal.lock().current_lsn().saturating_sub(1).to_string())
            }
            "sortkv.sstables" => Some(match self.storage.current() {
                Some(t) => format!(
                    "{} entries={} bytes={}\n",
                    t.file_name(),
                    t.entry_count,
                    t.file_size
                ),
                None => String::new(),
            }),
            "sortkv.stats" => {
                let (wal_bytes, last_lsn) = {
                    let wal = self.wal.lock();
                    (wal.size(), wal.current_lsn().saturating_sub(1))
                };
                Some(format!(
                    "entries: {}\napproximate bytes: {}\nwal bytes: {}\nlast sequence: {}\nsstables: {}\n",
                    self.memtable.entry_count(),
                    self.memtable.size(),
                    wal_bytes,
                    last_lsn,
                    self.storage.sstable_count()
                ))
            }
            _ => None,
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the storage directory path (where SSTables are stored)
    pub fn storage_dir(&self) -> PathBuf {
        self.config.data_dir.join(Self::SSTABLE_DIR)
    }

    /// Get the current entry count
    pub fn entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    /// Get the number of SSTables
    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    /// Get the current WAL size in bytes
    pub fn wal_size(&self) -> u64 {
        self.wal.lock().size()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

// =============================================================================
// Engine Trait Implementations
// =============================================================================

impl KvRead for Engine {
    type Cursor = TableCursor;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Engine::get(self, key)
    }

    /// The cursor reads the keyspace as of this call
    fn cursor(&self) -> Result<TableCursor> {
        Ok(TableCursor::new(self.memtable.view()))
    }
}

impl KvWrite for Engine {
    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.commit(batch.into_ops())
    }

    fn flush(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        if wal.size() > 0 {
            self.checkpoint_locked(&mut wal)?;
        }
        wal.sync()
    }
}

impl KvSnapshot for Engine {
    type Snapshot = Snapshot;

    fn snapshot(&self) -> Result<Snapshot> {
        // Holding the writer lock pairs the view with the LSN it reflects
        let wal = self.wal.lock();
        Ok(Snapshot {
            view: self.memtable.view(),
            sequence: wal.current_lsn().saturating_sub(1),
        })
    }
}

/// Immutable point-in-time view of an engine's keyspace
///
/// Released when dropped.
#[derive(Clone)]
pub struct Snapshot {
    view: TableView,
    sequence: u64,
}

impl Snapshot {
    /// LSN of the last batch visible through this snapshot
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }
}

impl KvRead for Snapshot {
    type Cursor = TableCursor;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.view.get(key).cloned())
    }

    fn cursor(&self) -> Result<TableCursor> {
        Ok(TableCursor::new(self.view.clone()))
    }
}
