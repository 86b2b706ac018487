// Hashing engine
// Concurrent streaming multi-algorithm digest computation for file batches

pub mod algorithm;
pub mod batch;
pub mod error;
pub mod reader;
pub mod task;

// Re-export commonly used types for convenience
pub use algorithm::{AlgorithmId, AlgorithmSet, DigestSet, Hasher};
pub use batch::{BatchEngine, BatchProgress, BatchReport, FileEntry, HashJob, ProgressCallback};
pub use error::HashError;
pub use reader::{ChunkReader, DEFAULT_CHUNK_SIZE};
pub use task::{hash_file, CancelToken, FileOutcome, FileStatus};
