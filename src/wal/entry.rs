//! WAL Entry definitions
//!
//! Defines the structure of individual WAL records.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{KvError, Result};
use crate::store::Operation;

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a single record's data length; anything larger is corrupt
pub const MAX_RECORD_SIZE: u32 = 256 * 1024 * 1024;

/// A single record in the WAL: one atomically committed batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// Operations of the batch, in commit order
    pub ops: Vec<Operation>,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

impl WalEntry {
    pub fn new(lsn: u64, ops: Vec<Operation>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { lsn, ops, timestamp }
    }

    /// Encode as header + data
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(&(&self.ops, self.timestamp))?;
        if data.len() > MAX_RECORD_SIZE as usize {
            return Err(KvError::Serialization(format!(
                "WAL record too large: {} bytes (max {})",
                data.len(),
                MAX_RECORD_SIZE
            )));
        }

        let crc = Self::compute_crc(self.lsn, &data);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Decode a record, verifying its checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header: &[u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| {
                KvError::WalCorruption(format!(
                    "record header truncated: {} of {} bytes",
                    bytes.len(),
                    HEADER_SIZE
                ))
            })?;
        let (lsn, crc, len) = Self::parse_header(header);

        let data = bytes
            .get(HEADER_SIZE..HEADER_SIZE + len as usize)
            .ok_or_else(|| {
                KvError::WalCorruption(format!(
                    "record {} truncated: expected {} data bytes, got {}",
                    lsn,
                    len,
                    bytes.len() - HEADER_SIZE
                ))
            })?;

        let actual = Self::compute_crc(lsn, data);
        if actual != crc {
            return Err(KvError::WalCorruption(format!(
                "CRC mismatch on record {}: stored {:08x}, computed {:08x}",
                lsn, crc, actual
            )));
        }

        let (ops, timestamp): (Vec<Operation>, u64) = bincode::deserialize(data)
            .map_err(|e| KvError::WalCorruption(format!("record {}: {}", lsn, e)))?;

        Ok(Self { lsn, ops, timestamp })
    }

    /// Split a header into (lsn, crc, data_len)
    pub(crate) fn parse_header(header: &[u8; HEADER_SIZE]) -> (u64, u32, u32) {
        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&header[0..8]);
        crc.copy_from_slice(&header[8..12]);
        len.copy_from_slice(&header[12..16]);
        (
            u64::from_le_bytes(lsn),
            u32::from_le_bytes(crc),
            u32::from_le_bytes(len),
        )
    }

    fn compute_crc(lsn: u64, data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&lsn.to_le_bytes());
        hasher.update(data);
        hasher.finalize()
    }
}
