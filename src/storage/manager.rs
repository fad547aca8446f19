//! Storage Manager
//!
//! Owns the checkpoint files of one keyspace.
//!
//! ## Responsibilities
//! - Discover the newest checkpoint on startup
//! - Load it back into memory
//! - Write new checkpoints from a table view
//! - Delete superseded and half-written files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;

use super::{SSTable, SSTableBuilder, SSTableReader};

/// Manages the checkpoint files
///
/// ## Concurrency:
/// - `current`: Protected by RwLock (readers for stats, exclusive on swap)
/// - `next_sstable_id`: Atomic counter (lock-free)
/// - Checkpoints are only written by the engine's single writer
pub struct StorageManager {
    /// Directory where SSTables are stored
    data_dir: PathBuf,

    /// The checkpoint the keyspace was last persisted to
    current: RwLock<Option<SSTable>>,

    /// Next ID for creating new SSTables (atomic, lock-free)
    next_sstable_id: AtomicU64,
}

impl StorageManager {
    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Remove temp files left by an interrupted checkpoint
    /// 3. Validate the newest SSTable
    /// 4. Delete older SSTables it supersedes
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut sstable_ids: Vec<u64> = Vec::new();

        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() {
                continue;
            }

            if file_path.extension().is_some_and(|ext| ext == "tmp") {
                tracing::debug!("Removing stale checkpoint {}", file_path.display());
                fs::remove_file(&file_path)?;
            } else if let Some(id) = Self::parse_sstable_id(&file_path) {
                sstable_ids.push(id);
            }
        }

        // Newest first
        sstable_ids.sort_unstable_by(|a, b| b.cmp(a));

        let current = match sstable_ids.first() {
            Some(&id) => {
                let reader = SSTableReader::open(&Self::sstable_path_with_dir(path, id))?;
                Some(SSTable {
                    path: reader.path().to_path_buf(),
                    entry_count: reader.entry_count(),
                    min_key: Vec::new(),
                    max_key: Vec::new(),
                    file_size: reader.file_size(),
                })
            }
            None => None,
        };

        for &old in sstable_ids.iter().skip(1) {
            let old_path = Self::sstable_path_with_dir(path, old);
            tracing::debug!("Removing superseded checkpoint {}", old_path.display());
            fs::remove_file(&old_path)?;
        }

        let next_id = sstable_ids.first().map(|&id| id + 1).unwrap_or(1);

        Ok(Self {
            data_dir: path.to_path_buf(),
            current: RwLock::new(current),
            next_sstable_id: AtomicU64::new(next_id),
        })
    }

    /// Load the current checkpoint into an ordered map
    pub fn load(&self) -> Result<BTreeMap<Vec<u8>, Vec<u8>>> {
        let mut map = BTreeMap::new();

        let Some(path) = self.current.read().as_ref().map(|t| t.path.clone()) else {
            return Ok(map);
        };

        let mut reader = SSTableReader::open(&path)?;
        for entry in reader.iter()? {
            let (key, value) = entry?;
            map.insert(key, value);
        }

        if let Some(table) = self.current.write().as_mut() {
            table.entry_count = map.len() as u64;
            table.min_key = map.keys().next().cloned().unwrap_or_default();
            table.max_key = map.keys().next_back().cloned().unwrap_or_default();
        }

        Ok(map)
    }

    /// Persist `table` as the new checkpoint
    ///
    /// The file is built under a temp name and renamed into place, so a
    /// crash leaves either the old checkpoint or the new one.
    pub fn checkpoint(&self, table: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<SSTable> {
        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let final_path = self.sstable_path(id);
        let tmp_path = final_path.with_extension("sst.tmp");

        let mut builder = SSTableBuilder::new(&tmp_path)?;
        for (key, value) in table {
            builder.add(key, value)?;
        }
        let mut metadata = builder.finish()?;

        fs::rename(&tmp_path, &final_path)?;
        Self::sync_dir(&self.data_dir);
        metadata.path = final_path;

        let previous = self.current.write().replace(metadata.clone());
        if let Some(old) = previous {
            if let Err(e) = fs::remove_file(&old.path) {
                tracing::warn!("Failed to remove old checkpoint {}: {}", old.path.display(), e);
            }
        }

        Ok(metadata)
    }

    /// Get the number of SSTables
    pub fn sstable_count(&self) -> usize {
        usize::from(self.current.read().is_some())
    }

    /// Metadata of the current checkpoint
    pub fn current(&self) -> Option<SSTable> {
        self.current.read().clone()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the next SSTable ID (for testing/debugging)
    pub fn next_sstable_id(&self) -> u64 {
        self.next_sstable_id.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Generate the file path for an SSTable with given ID
    fn sstable_path(&self, id: u64) -> PathBuf {
        Self::sstable_path_with_dir(&self.data_dir, id)
    }

    /// Generate SSTable path given a directory and ID
    fn sstable_path_with_dir(dir: &Path, id: u64) -> PathBuf {
        dir.join(format!("sstable_{:06}.sst", id))
    }

    /// Parse SSTable ID from filename
    /// "sstable_000042.sst" → Some(42)
    fn parse_sstable_id(path: &Path) -> Option<u64> {
        if path.extension()? != "sst" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let id_str = name.strip_prefix("sstable_")?;
        id_str.parse().ok()
    }

    /// Persist the rename on filesystems that need a directory fsync
    fn sync_dir(dir: &Path) {
        if let Ok(handle) = fs::File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}
