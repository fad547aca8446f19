//! WAL Reader
//!
//! Handles reading records from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{KvError, Result};

use super::{WalEntry, HEADER_SIZE, MAX_RECORD_SIZE};

/// Reads records from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Offset just past the last record read successfully
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at a clean end of file. A partial header, a
    /// partial body, or a checksum mismatch is `WalCorruption`.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(KvError::WalCorruption(format!(
                "partial record header at offset {} ({} bytes)",
                self.position, read
            )));
        }

        let (lsn, _, len) = WalEntry::parse_header(&header);
        if len > MAX_RECORD_SIZE {
            return Err(KvError::WalCorruption(format!(
                "record {} at offset {} claims {} bytes",
                lsn, self.position, len
            )));
        }

        let mut record = Vec::with_capacity(HEADER_SIZE + len as usize);
        record.extend_from_slice(&header);
        record.resize(HEADER_SIZE + len as usize, 0);
        let body = read_full(&mut self.reader, &mut record[HEADER_SIZE..])?;
        if body < len as usize {
            return Err(KvError::WalCorruption(format!(
                "partial record {} at offset {} ({} of {} bytes)",
                lsn, self.position, body, len
            )));
        }

        let entry = WalEntry::deserialize(&record)?;
        self.position += record.len() as u64;
        Ok(Some(entry))
    }

    /// Offset just past the last record read successfully
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over records; stops after the first error
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over WAL records
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the stream allows, returning bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
