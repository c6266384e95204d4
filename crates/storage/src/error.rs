//! Query store errors

use std::time::Duration;

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from building or querying a store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Statement is not read-only; it never reached the engine
    #[error("rejected query: {0}")]
    Rejected(String),

    /// Malformed statement or engine failure while querying
    #[error("query error: {0}")]
    Query(String),

    /// Result set larger than the configured maximum
    #[error("query returned more than {limit} rows; add a LIMIT clause")]
    LimitExceeded {
        /// Configured maximum row count
        limit: usize,
    },

    /// Query ran past the configured deadline and was interrupted
    #[error("query interrupted after {0:?}")]
    Timeout(Duration),

    /// Building the store failed
    #[error("store build failed: {0}")]
    Build(String),
}

impl StoreError {
    /// True for [`StoreError::Rejected`]
    pub fn is_rejected(&self) -> bool {
        matches!(self, StoreError::Rejected(_))
    }
}
