// File stream reader
// Yields fixed-size chunks from a file opened for shared read

use super::error::HashError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default chunk size for streaming reads (4 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Lazy, finite, non-restartable sequence of byte chunks from one file
///
/// The file is opened read-only and never exclusively, so other readers are
/// not blocked. Each call to `next_chunk` yields at most `chunk_size` bytes;
/// `None` marks end-of-file. Any read failure is terminal for the file.
pub struct ChunkReader {
    file: File,
    path: PathBuf,
    buffer: Vec<u8>,
    bytes_read: u64,
}

impl ChunkReader {
    /// Open a file for streaming reads
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, HashError> {
        let file = File::open(path).map_err(|e| {
            HashError::from_io_error(e, "reading", Some(path.to_path_buf()))
        })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            buffer: vec![0u8; chunk_size],
            bytes_read: 0,
        })
    }

    /// Read the next chunk, or `None` at end-of-file
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>, HashError> {
        let n = self.file.read(&mut self.buffer).map_err(|e| {
            HashError::from_io_error(e, "reading", Some(self.path.clone()))
        })?;

        if n == 0 {
            return Ok(None);
        }

        self.bytes_read += n as u64;
        Ok(Some(&self.buffer[..n]))
    }

    /// Cumulative bytes read so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}
