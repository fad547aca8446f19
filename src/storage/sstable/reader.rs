//! SSTable Reader
//!
//! Opens SSTable files, validates them, and streams their entries.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};

use super::iterator::SSTableIterator;
use super::{le_u16, le_u32, le_u64, FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// Reader for SSTable files
pub struct SSTableReader {
    path: PathBuf,
    /// File handle for reading entries
    file: BufReader<File>,
    entry_count: u64,
    /// Offset where the data block ends (start of footer)
    data_end: u64,
    file_size: u64,
}

impl SSTableReader {
    /// Open an SSTable for reading
    ///
    /// Validates magic, version, layout, and the data block checksum.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size < HEADER_SIZE + FOOTER_SIZE {
            return Err(KvError::Storage(format!(
                "SSTable {} too small: {} bytes",
                path.display(),
                file_size
            )));
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(KvError::Storage(format!(
                "Invalid SSTable magic in {}: {:?}",
                path.display(),
                &header[0..4]
            )));
        }

        let version = le_u16(&header[4..6]);
        if version != VERSION {
            return Err(KvError::Storage(format!(
                "Unsupported SSTable version: {}",
                version
            )));
        }

        let entry_count = le_u64(&header[6..14]);

        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer)?;

        let data_end = le_u64(&footer[0..8]);
        let data_crc = le_u32(&footer[8..12]);

        if data_end != file_size - FOOTER_SIZE {
            return Err(KvError::Storage(format!(
                "SSTable {} footer points at {}, expected {}",
                path.display(),
                data_end,
                file_size - FOOTER_SIZE
            )));
        }

        // Checksum the data block in one streaming pass
        file.seek(SeekFrom::Start(HEADER_SIZE))?;
        let mut hasher = crc32fast::Hasher::new();
        let mut remaining = data_end - HEADER_SIZE;
        let mut buf = vec![0u8; 64 * 1024];
        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            file.read_exact(&mut buf[..want])?;
            hasher.update(&buf[..want]);
            remaining -= want as u64;
        }
        if hasher.finalize() != data_crc {
            return Err(KvError::Storage(format!(
                "SSTable {} data checksum mismatch",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: BufReader::new(file),
            entry_count,
            data_end,
            file_size,
        })
    }

    /// Get entry count
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate over all entries in key order
    pub fn iter(&mut self) -> Result<SSTableIterator<'_>> {
        SSTableIterator::new(&mut self.file, self.data_end)
    }
}
