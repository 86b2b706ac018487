// Per-file hash task
// Drives one file's chunk stream through its accumulator set

use super::algorithm::{AlgorithmId, AlgorithmSet, DigestSet};
use super::reader::ChunkReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation signal for one batch run
///
/// Set at most effectively once; observed cooperatively by every in-flight
/// task at chunk boundaries. Never resets within a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (idempotent)
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Lifecycle of one file in a batch
///
/// `Done`, `Cancelled` and `Error` are terminal; an entry never leaves a
/// terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FileStatus {
    Pending,
    Computing,
    Done,
    Cancelled,
    Error,
}

impl FileStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Done | FileStatus::Cancelled | FileStatus::Error)
    }
}

/// Terminal notification from one hash task
///
/// Exactly one is produced per file. `digests` is populated only for `Done`
/// (in algorithm-set order), `error` only for `Error`.
#[derive(Debug)]
pub struct FileOutcome {
    pub index: usize,
    pub status: FileStatus,
    pub digests: Vec<(AlgorithmId, String)>,
    pub error: Option<String>,
    pub bytes_read: u64,
}

impl FileOutcome {
    fn done(index: usize, digests: Vec<(AlgorithmId, String)>, bytes_read: u64) -> Self {
        Self {
            index,
            status: FileStatus::Done,
            digests,
            error: None,
            bytes_read,
        }
    }

    fn cancelled(index: usize, bytes_read: u64) -> Self {
        Self {
            index,
            status: FileStatus::Cancelled,
            digests: Vec::new(),
            error: None,
            bytes_read,
        }
    }

    fn error(index: usize, message: String, bytes_read: u64) -> Self {
        Self {
            index,
            status: FileStatus::Error,
            digests: Vec::new(),
            error: Some(message),
            bytes_read,
        }
    }
}

/// Hash one file with every algorithm in the set, in a single read pass
///
/// Checks the cancellation token before every chunk read. A read failure
/// discards all partial accumulator state for the file; no per-algorithm
/// partial results are kept. Never panics on I/O problems; every exit path
/// reports a terminal outcome.
pub fn hash_file(
    index: usize,
    path: &Path,
    algorithms: &AlgorithmSet,
    cancel: &CancelToken,
    chunk_size: usize,
) -> FileOutcome {
    let mut digests = DigestSet::new(algorithms);

    let mut reader = match ChunkReader::open(path, chunk_size) {
        Ok(reader) => reader,
        Err(e) => return FileOutcome::error(index, e.to_string(), 0),
    };

    loop {
        if cancel.is_cancelled() {
            return FileOutcome::cancelled(index, reader.bytes_read());
        }

        match reader.next_chunk() {
            Ok(Some(chunk)) => digests.update(chunk),
            Ok(None) => break,
            Err(e) => return FileOutcome::error(index, e.to_string(), reader.bytes_read()),
        }
    }

    FileOutcome::done(index, digests.finalize(), reader.bytes_read())
}
