//! Cache errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors from reading or writing the snapshot cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Snapshot could not be encoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File exists but does not hold a valid snapshot
    #[error("corrupt snapshot '{}': {reason}", path.display())]
    Corrupt {
        /// The cache file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CacheError::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
