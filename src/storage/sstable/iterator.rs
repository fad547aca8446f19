//! SSTable Iterator
//!
//! Sequential iteration over all entries in an SSTable.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::error::{KvError, Result};

use super::{le_u32, HEADER_SIZE};

/// Iterator over SSTable entries in sorted key order
pub struct SSTableIterator<'a> {
    file: &'a mut BufReader<File>,
    /// Stop reading when we reach this offset (start of footer)
    end_offset: u64,
    /// Current position in file
    current_offset: u64,
    /// Set after an error so iteration ends
    failed: bool,
}

impl<'a> SSTableIterator<'a> {
    /// Create a new iterator starting from the data block
    pub(super) fn new(file: &'a mut BufReader<File>, end_offset: u64) -> Result<Self> {
        file.seek(SeekFrom::Start(HEADER_SIZE))?;
        Ok(Self {
            file,
            end_offset,
            current_offset: HEADER_SIZE,
            failed: false,
        })
    }

    fn read_entry(&mut self) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut header = [0u8; 8];
        self.file.read_exact(&mut header)?;

        let key_len = le_u32(&header[0..4]) as u64;
        let val_len = le_u32(&header[4..8]) as u64;

        let entry_size = 8 + key_len + val_len;
        if self.current_offset + entry_size > self.end_offset {
            return Err(KvError::Storage(format!(
                "SSTable entry at offset {} overruns the data block",
                self.current_offset
            )));
        }

        let mut key = vec![0u8; key_len as usize];
        self.file.read_exact(&mut key)?;
        let mut value = vec![0u8; val_len as usize];
        self.file.read_exact(&mut value)?;

        self.current_offset += entry_size;
        Ok((key, value))
    }
}

impl<'a> Iterator for SSTableIterator<'a> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.current_offset >= self.end_offset {
            return None;
        }

        let entry = self.read_entry();
        if entry.is_err() {
            self.failed = true;
        }
        Some(entry)
    }
}
