//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant says which kind of failure happened
//! - **Serializable**: Can be converted to/from JSON

use roster_engine::EngineError;
use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Caller | `RejectedQuery`, `Query` | The statement was refused or failed |
/// | Freshness | `RefreshFailed`, `Startup` | Upstream or cache trouble |
/// | System | `Config`, `Io`, `Internal` | Infrastructure errors |
///
/// # Example
///
/// ```ignore
/// match executor.execute(Command::query("DELETE FROM members")) {
///     Err(Error::RejectedQuery { reason }) => println!("{}", reason),
///     other => println!("{:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Caller Errors ====================
    /// Statement is not a read-only query; never retried
    #[error("rejected query: {reason}")]
    RejectedQuery { reason: String },

    /// Statement failed: malformed SQL, too many rows, or timeout
    #[error("query error: {reason}")]
    Query { reason: String },

    // ==================== Freshness Errors ====================
    /// A forced refresh failed; the previous data is still served
    #[error("refresh failed: {reason}")]
    RefreshFailed {
        reason: String,
        /// Members still served, if any data is installed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        member_count: Option<usize>,
    },

    /// No data could be loaded from the cache or upstream
    #[error("no roster data available: {reason}")]
    Startup { reason: String },

    // ==================== System Errors ====================
    /// Invalid configuration
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Rejected(reason) => Error::RejectedQuery { reason },
            EngineError::Query(e) => Error::Query {
                reason: e.to_string(),
            },
            EngineError::Refresh(e) => Error::RefreshFailed {
                reason: e.to_string(),
                member_count: None,
            },
            EngineError::Startup(e) => Error::Startup {
                reason: e.to_string(),
            },
            EngineError::Cache(e) => Error::Io {
                reason: e.to_string(),
            },
            EngineError::Config(reason) => Error::Config { reason },
        }
    }
}
