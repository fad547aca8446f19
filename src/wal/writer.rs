//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::WalSyncStrategy;
use crate::error::{KvError, Result};
use crate::store::Operation;

use super::WalEntry;

/// Writes records to the WAL file
pub struct WalWriter {
    writer: BufWriter<File>,
    /// LSN the next record will get
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Records written since the last fsync
    uncommitted: usize,
    /// Current file length in bytes
    size: u64,
    /// Set after a failed append; the file tail is no longer trustworthy
    failed: bool,
}

impl WalWriter {
    /// Open or create a WAL file, appending after any existing content.
    ///
    /// LSNs start at 1.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        Self::open_at(path, sync_strategy, 1)
    }

    /// Open or create a WAL file whose next record gets `next_lsn`
    pub fn open_at(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            writer: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            uncommitted: 0,
            size,
            failed: false,
        })
    }

    /// Append one batch as a single record, returning its LSN
    pub fn append(&mut self, ops: Vec<Operation>) -> Result<u64> {
        if self.failed {
            return Err(KvError::Storage(
                "WAL is unusable after an earlier write failure".to_string(),
            ));
        }

        let lsn = self.next_lsn;
        let bytes = WalEntry::new(lsn, ops).serialize()?;

        if let Err(e) = self.writer.write_all(&bytes).and_then(|_| self.writer.flush()) {
            self.failed = true;
            return Err(KvError::Storage(format!(
                "WAL append of record {} failed: {}",
                lsn, e
            )));
        }

        self.next_lsn += 1;
        self.size += bytes.len() as u64;
        self.uncommitted += 1;

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted >= count,
        };
        if due {
            // The record is already in the file; if it cannot be made
            // durable, recovery may or may not see it.
            if let Err(e) = self.sync() {
                self.failed = true;
                return Err(e);
            }
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Discard all records (their contents are durable elsewhere).
    ///
    /// LSNs keep increasing across truncation.
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;
        self.size = 0;
        self.uncommitted = 0;
        self.failed = false;
        Ok(())
    }

    /// Get the LSN the next record will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Records written but not yet fsynced
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Current WAL file size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}
