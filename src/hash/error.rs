// Centralized error handling module
// Provides error types with path and operation context for all hashing operations

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for the hashing engine
/// Carries file paths and the operation that failed
#[derive(Debug)]
pub enum HashError {
    /// File system errors with context
    FileNotFound { path: PathBuf },
    PermissionDenied { path: PathBuf, operation: String },
    Io { path: Option<PathBuf>, operation: String, source: io::Error },

    /// Configuration errors, rejected before a job starts
    UnsupportedAlgorithm { algorithm: String },
    EmptyAlgorithmSet,
    DuplicatePath { path: PathBuf },
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HashError::FileNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            HashError::PermissionDenied { path, operation } => {
                write!(f, "Permission denied while {} file: {}", operation, path.display())
            }
            HashError::Io { path, operation, source } => {
                if let Some(p) = path {
                    write!(f, "I/O error while {} file {}: {}", operation, p.display(), source)
                } else {
                    write!(f, "I/O error while {}: {}", operation, source)
                }
            }
            HashError::UnsupportedAlgorithm { algorithm } => {
                write!(f, "Unsupported hash algorithm: {}", algorithm)
            }
            HashError::EmptyAlgorithmSet => {
                write!(f, "No hash algorithms selected: at least one is required")
            }
            HashError::DuplicatePath { path } => {
                write!(f, "Duplicate file path in batch: {}", path.display())
            }
        }
    }
}

impl std::error::Error for HashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HashError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// Conversion from io::Error with context
impl HashError {
    /// Create an error with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        // Map specific error kinds to more specific variants
        match err.kind() {
            io::ErrorKind::NotFound => {
                if let Some(p) = path {
                    HashError::FileNotFound { path: p }
                } else {
                    HashError::Io {
                        path: None,
                        operation: operation.to_string(),
                        source: err,
                    }
                }
            }
            io::ErrorKind::PermissionDenied => {
                if let Some(p) = path {
                    HashError::PermissionDenied {
                        path: p,
                        operation: operation.to_string(),
                    }
                } else {
                    HashError::Io {
                        path: None,
                        operation: operation.to_string(),
                        source: err,
                    }
                }
            }
            _ => HashError::Io {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }
}

// Default From implementation for io::Error (without context)
impl From<io::Error> for HashError {
    fn from(err: io::Error) -> Self {
        HashError::from_io_error(err, "unknown operation", None)
    }
}
