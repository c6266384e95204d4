//! Engine errors

use roster_durability::CacheError;
use roster_source::FetchError;
use roster_storage::StoreError;
use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Why a refresh (fetch + build) did not install new data.
///
/// Shared by every caller waiting on the same refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Upstream fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Fetched data could not be materialized
    #[error(transparent)]
    Build(#[from] StoreError),

    /// The refreshing thread unwound before finishing
    #[error("refresh aborted before completing")]
    Aborted,
}

/// Errors surfaced by the freshness coordinator
#[derive(Debug, Error)]
pub enum EngineError {
    /// Statement is not read-only
    #[error("rejected query: {0}")]
    Rejected(String),

    /// Statement failed in the store
    #[error(transparent)]
    Query(StoreError),

    /// A forced refresh failed; the previous data is still served
    #[error("refresh failed: {0}")]
    Refresh(RefreshError),

    /// Nothing could be loaded and nothing was installed before
    #[error("no roster data available: {0}")]
    Startup(RefreshError),

    /// Snapshot cache could not be opened
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected(reason) => EngineError::Rejected(reason),
            other => EngineError::Query(other),
        }
    }
}
