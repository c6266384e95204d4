//! Fetch errors
//!
//! Every way a fetch can fail is a [`FetchError`]. The freshness layer only
//! needs to know that the fetch failed; the variant is for logs and users.

use thiserror::Error;

/// Errors that can occur while pulling the roster from upstream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request could not be completed (DNS, connect, TLS, timeout, body read)
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Body was not a valid roster payload
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<roster_core::Error> for FetchError {
    fn from(e: roster_core::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}
