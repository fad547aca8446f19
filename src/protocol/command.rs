//! Command definitions
//!
//! Represents requests from clients, already decoded from the wire.

use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::ops::{Direction, OpRecord, ScanRequest, MAX_SCAN_LIMIT};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Put = 0x02,
    Delete = 0x03,
    Ping = 0x04,
    MultiGet = 0x05,
    Iterate = 0x06,
    Batch = 0x07,
    Property = 0x08,
    Snapshot = 0x09,
}

impl CommandType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => CommandType::Get,
            0x02 => CommandType::Put,
            0x03 => CommandType::Delete,
            0x04 => CommandType::Ping,
            0x05 => CommandType::MultiGet,
            0x06 => CommandType::Iterate,
            0x07 => CommandType::Batch,
            0x08 => CommandType::Property,
            0x09 => CommandType::Snapshot,
            _ => return None,
        })
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },

    /// Ping (health check)
    Ping,

    /// Get several keys; missing ones are omitted from the reply
    MultiGet { keys: Vec<Vec<u8>> },

    /// Range scan
    Iterate(IterateArgs),

    /// Atomic batch of put/delete operations
    Batch { ops: Vec<OpRecord> },

    /// Engine property lookup
    Property { name: String },

    /// Export a point-in-time copy to a new keyspace at `destination`
    Snapshot { destination: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Put { .. } => CommandType::Put,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
            Command::MultiGet { .. } => CommandType::MultiGet,
            Command::Iterate(_) => CommandType::Iterate,
            Command::Batch { .. } => CommandType::Batch,
            Command::Property { .. } => CommandType::Property,
            Command::Snapshot { .. } => CommandType::Snapshot,
        }
    }
}

/// Range scan arguments as a client sends them
///
/// Defaults: start and end open, start inclusive, end exclusive, forward,
/// up to [`MAX_SCAN_LIMIT`] items, values included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterateArgs {
    pub start: Option<Vec<u8>>,
    pub end: Option<Vec<u8>>,
    pub include_start: bool,
    pub include_end: bool,
    pub forward: bool,
    pub max: Option<u64>,
    pub include_values: bool,
}

impl Default for IterateArgs {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            include_start: true,
            include_end: false,
            forward: true,
            max: None,
            include_values: true,
        }
    }
}

impl IterateArgs {
    /// Resolve into a scan request; `max` above the cap is ignored
    pub fn to_scan_request(&self) -> ScanRequest {
        let bound = |key: &Option<Vec<u8>>, inclusive: bool| match key {
            None => Bound::Unbounded,
            Some(k) if inclusive => Bound::Included(k.clone()),
            Some(k) => Bound::Excluded(k.clone()),
        };

        let limit = self
            .max
            .map(|m| m.min(MAX_SCAN_LIMIT as u64) as usize)
            .unwrap_or(MAX_SCAN_LIMIT);

        ScanRequest::new(
            bound(&self.start, self.include_start),
            bound(&self.end, self.include_end),
            if self.forward {
                Direction::Forward
            } else {
                Direction::Backward
            },
            limit,
        )
    }
}
