//! Snapshot Exporter
//!
//! Copies a point-in-time view of a keyspace into a brand-new keyspace.
//!
//! ## Lifecycle
//! 1. Create the destination (refusing to touch an existing path)
//! 2. Capture one snapshot of the source
//! 3. Walk it in ascending order, committing chunks of [`EXPORT_CHUNK_SIZE`]
//! 4. Flush the destination
//!
//! Any failure after the destination path appears, including a create that
//! fails partway, closes the destination and deletes it, so a failed export
//! leaves nothing behind. The snapshot and destination handles are dropped
//! on every path.

use std::fs;
use std::mem;
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::store::{KvCursor, KvRead, KvSnapshot, KvWrite, WriteBatch};

/// Entries committed to the destination per batch
pub const EXPORT_CHUNK_SIZE: usize = 1000;

/// What an export copied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub entries: u64,
    pub chunks: u64,
}

/// Exports snapshots of `source` into new keyspaces
pub struct SnapshotExporter<'a, S> {
    source: &'a S,
    chunk_size: usize,
}

impl<'a, S: KvSnapshot> SnapshotExporter<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            chunk_size: EXPORT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Export into a new engine keyspace at `destination`.
    ///
    /// Blocks until the whole keyspace is copied.
    pub fn export(&self, destination: impl AsRef<Path>) -> Result<ExportStats> {
        self.export_with(destination.as_ref(), |path| {
            Engine::create(Config::builder().data_dir(path).build())
        })
    }

    /// Export into a destination produced by `create`.
    ///
    /// `create` must fail rather than reuse anything already at `path`;
    /// whatever it creates there is removed if the export fails.
    pub fn export_with<D, F>(&self, destination: &Path, create: F) -> Result<ExportStats>
    where
        D: KvWrite,
        F: FnOnce(&Path) -> Result<D>,
    {
        let started = Instant::now();
        let existed = fs::symlink_metadata(destination).is_ok();

        let dest = match create(destination) {
            Ok(dest) => dest,
            Err(e) => {
                // Never touch a path that was there before, but clear out
                // whatever a failed create left behind
                if !existed && !matches!(e, KvError::AlreadyExists(_)) {
                    tracing::warn!(
                        "Creating export destination {} failed: {}",
                        destination.display(),
                        e
                    );
                    Self::remove_partial(destination);
                }
                return Err(e);
            }
        };

        let outcome = self.copy_into(&dest).and_then(|stats| {
            dest.flush()?;
            Ok(stats)
        });
        drop(dest);

        match outcome {
            Ok(stats) => {
                tracing::info!(
                    "Exported {} entries in {} chunks to {} ({:?})",
                    stats.entries,
                    stats.chunks,
                    destination.display(),
                    started.elapsed()
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!(
                    "Export to {} failed, removing partial copy: {}",
                    destination.display(),
                    e
                );
                Self::remove_partial(destination);
                Err(e)
            }
        }
    }

    fn remove_partial(destination: &Path) {
        if fs::symlink_metadata(destination).is_err() {
            return;
        }
        if let Err(cleanup) = fs::remove_dir_all(destination) {
            tracing::warn!(
                "Failed to remove partial export {}: {}",
                destination.display(),
                cleanup
            );
        }
    }

    fn copy_into<D: KvWrite>(&self, dest: &D) -> Result<ExportStats> {
        let snapshot = self.source.snapshot()?;
        let mut cursor = snapshot.cursor()?;
        cursor.seek_to_first()?;

        let mut stats = ExportStats::default();
        let mut batch = WriteBatch::with_capacity(self.chunk_size);

        while let Some((key, value)) = cursor.current() {
            batch.put(key, value);
            stats.entries += 1;

            if batch.len() >= self.chunk_size {
                let chunk = mem::replace(&mut batch, WriteBatch::with_capacity(self.chunk_size));
                dest.write(chunk)?;
                stats.chunks += 1;
                tracing::debug!(
                    "Export chunk {} committed ({} entries so far)",
                    stats.chunks,
                    stats.entries
                );
            }

            cursor.next()?;
        }

        if !batch.is_empty() {
            dest.write(batch)?;
            stats.chunks += 1;
        }

        Ok(stats)
    }
}
