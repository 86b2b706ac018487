// Batch dispatch and result aggregation
// Runs one hash task per file and folds terminal outcomes into a report

use super::algorithm::{AlgorithmId, AlgorithmSet};
use super::error::HashError;
use super::reader::DEFAULT_CHUNK_SIZE;
use super::task::{hash_file, CancelToken, FileStatus};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use crossbeam_channel::unbounded;

/// One row of a batch: a file and its (eventual) results
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Size captured when the entry was created; advisory only
    pub size_bytes: u64,
    pub status: FileStatus,
    /// Digests in algorithm-set order; populated only when status is Done
    pub digests: Vec<(AlgorithmId, String)>,
    /// Populated only when status is Error
    pub error: Option<String>,
}

impl FileEntry {
    fn new(path: PathBuf) -> Self {
        let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self {
            path,
            size_bytes,
            status: FileStatus::Pending,
            digests: Vec::new(),
            error: None,
        }
    }

    /// Look up the digest for one algorithm, if present
    pub fn digest(&self, id: AlgorithmId) -> Option<&str> {
        self.digests
            .iter()
            .find(|(alg, _)| *alg == id)
            .map(|(_, hex)| hex.as_str())
    }
}

/// The unit of work for one run: entries, algorithm selection, and the
/// shared cancellation handle
///
/// Created at run start and consumed by `BatchEngine::run`; it does not
/// outlive one invocation.
pub struct HashJob {
    entries: Vec<FileEntry>,
    algorithms: Arc<AlgorithmSet>,
    cancel: CancelToken,
}

impl HashJob {
    /// Build a job from a file list and an algorithm selection
    ///
    /// Duplicate paths are rejected here, before anything runs.
    pub fn new(paths: Vec<PathBuf>, algorithms: AlgorithmSet) -> Result<Self, HashError> {
        let mut seen = HashSet::with_capacity(paths.len());
        for path in &paths {
            if !seen.insert(path.as_path()) {
                return Err(HashError::DuplicatePath { path: path.clone() });
            }
        }
        drop(seen);

        let entries = paths.into_iter().map(FileEntry::new).collect();
        Ok(Self {
            entries,
            algorithms: Arc::new(algorithms),
            cancel: CancelToken::new(),
        })
    }

    /// Handle for requesting cancellation from outside the run
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn algorithms(&self) -> &AlgorithmSet {
        &self.algorithms
    }
}

/// Progress snapshot emitted after each file reaches a terminal status
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchProgress {
    pub files_completed: usize,
    pub files_total: usize,
    /// Name of the file whose outcome was just recorded
    pub current_file: String,
    pub bytes_processed: u64,
}

/// Type alias for progress callback function
pub type ProgressCallback = Box<dyn Fn(BatchProgress) + Send + Sync>;

/// Final report for one batch run
#[derive(Debug, serde::Serialize)]
pub struct BatchReport {
    pub entries: Vec<FileEntry>,
    pub algorithms: AlgorithmSet,
    pub done: usize,
    pub cancelled: usize,
    pub failed: usize,
    pub total_bytes: u64,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    pub was_cancelled: bool,
}

// Helper function to serialize Duration as seconds
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

impl BatchReport {
    pub fn files_total(&self) -> usize {
        self.entries.len()
    }

    /// One-line human summary, distinguishing completed from cancelled runs
    pub fn summary(&self) -> String {
        if self.was_cancelled {
            format!(
                "Cancelled: {} of {} files hashed ({} done, {} cancelled, {} failed)",
                self.done,
                self.files_total(),
                self.done,
                self.cancelled,
                self.failed
            )
        } else {
            format!(
                "Complete: {} files hashed ({} done, {} failed)",
                self.files_total(),
                self.done,
                self.failed
            )
        }
    }
}

/// Engine for hashing a batch of files concurrently
///
/// Launches one hash task per file with no concurrency cap; `with_max_tasks`
/// switches to a bounded worker pool instead. All terminal outcomes flow
/// through a single channel consumed on the calling thread, so aggregation
/// needs no locking beyond the processed counter.
pub struct BatchEngine {
    chunk_size: usize,
    max_tasks: Option<usize>,
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl BatchEngine {
    /// Create a new engine with default settings (4 MiB chunks, one task
    /// per file)
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_tasks: None,
            progress_callback: None,
        }
    }

    /// Set the read chunk size; the choice never affects digests
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Cap the number of concurrent hash tasks
    ///
    /// `None` preserves the unbounded one-task-per-file behavior.
    pub fn with_max_tasks(mut self, max_tasks: Option<usize>) -> Self {
        self.max_tasks = max_tasks.filter(|n| *n > 0);
        self
    }

    /// Set a progress callback, invoked serially after each terminal outcome
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(BatchProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Run the job to completion and return the aggregated report
    ///
    /// Resolves once every launched task has reached a terminal status. A
    /// failure or cancellation in one file never aborts its siblings;
    /// entries already Done keep their digests when cancellation arrives.
    pub fn run(&self, job: HashJob) -> BatchReport {
        let HashJob {
            mut entries,
            algorithms,
            cancel,
        } = job;

        let start_time = Instant::now();
        let files_total = entries.len();

        // Single serialized channel for terminal notifications
        let (outcome_tx, outcome_rx) = unbounded();

        let handles = match self.max_tasks {
            None => self.spawn_unbounded(&mut entries, &algorithms, &cancel, &outcome_tx),
            Some(n) => self.spawn_pooled(&entries, &algorithms, &cancel, &outcome_tx, n),
        };

        // Drop the local sender so the channel closes once all tasks finish
        drop(outcome_tx);

        // Aggregate outcomes as they arrive, in any order. Each entry is
        // touched by exactly one task, so only the counter is shared.
        let completed = AtomicUsize::new(0);
        let mut total_bytes = 0u64;

        for outcome in outcome_rx.iter() {
            let entry = &mut entries[outcome.index];
            entry.status = outcome.status;
            entry.digests = outcome.digests;
            entry.error = outcome.error;
            total_bytes += outcome.bytes_read;

            let files_completed = completed.fetch_add(1, Ordering::Relaxed) + 1;

            if let Some(ref callback) = self.progress_callback {
                let current_file = entry
                    .path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                callback(BatchProgress {
                    files_completed,
                    files_total,
                    current_file,
                    bytes_processed: total_bytes,
                });
            }
        }

        for handle in handles {
            if let Err(e) = handle.join() {
                eprintln!("Warning: Hash task panicked: {:?}", e);
            }
        }

        let done = entries.iter().filter(|e| e.status == FileStatus::Done).count();
        let cancelled = entries
            .iter()
            .filter(|e| e.status == FileStatus::Cancelled)
            .count();
        let failed = entries.iter().filter(|e| e.status == FileStatus::Error).count();

        BatchReport {
            entries,
            algorithms: (*algorithms).clone(),
            done,
            cancelled,
            failed,
            total_bytes,
            duration: start_time.elapsed(),
            was_cancelled: cancel.is_cancelled(),
        }
    }

    /// Reference behavior: one thread per file, all launched at once
    fn spawn_unbounded(
        &self,
        entries: &mut [FileEntry],
        algorithms: &Arc<AlgorithmSet>,
        cancel: &CancelToken,
        outcome_tx: &crossbeam_channel::Sender<super::task::FileOutcome>,
    ) -> Vec<thread::JoinHandle<()>> {
        let mut handles = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter_mut().enumerate() {
            entry.status = FileStatus::Computing;

            let path = entry.path.clone();
            let algorithms = Arc::clone(algorithms);
            let cancel = cancel.clone();
            let tx = outcome_tx.clone();
            let chunk_size = self.chunk_size;

            handles.push(thread::spawn(move || {
                let outcome = hash_file(index, &path, &algorithms, &cancel, chunk_size);
                // Receiver outlives every task within run(); a send failure
                // means the run was torn down and the outcome is moot
                let _ = tx.send(outcome);
            }));
        }

        handles
    }

    /// Bounded worker pool pulling file indices from a shared queue
    fn spawn_pooled(
        &self,
        entries: &[FileEntry],
        algorithms: &Arc<AlgorithmSet>,
        cancel: &CancelToken,
        outcome_tx: &crossbeam_channel::Sender<super::task::FileOutcome>,
        pool_size: usize,
    ) -> Vec<thread::JoinHandle<()>> {
        let (work_tx, work_rx) = unbounded::<(usize, PathBuf)>();
        for (index, entry) in entries.iter().enumerate() {
            // Unbounded queue of pre-validated work items; send cannot fail
            // while work_rx is alive
            let _ = work_tx.send((index, entry.path.clone()));
        }
        drop(work_tx);

        let workers = pool_size.min(entries.len().max(1));
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let algorithms = Arc::clone(algorithms);
            let cancel = cancel.clone();
            let tx = outcome_tx.clone();
            let chunk_size = self.chunk_size;

            handles.push(thread::spawn(move || {
                while let Ok((index, path)) = work_rx.recv() {
                    let outcome = hash_file(index, &path, &algorithms, &cancel, chunk_size);
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
            }));
        }

        handles
    }
}

impl Default for BatchEngine {
    fn default() -> Self {
        Self::new()
    }
}
