//! Snapshot fetching for RosterDB
//!
//! The [`SnapshotFetcher`] trait is the seam between the freshness layer and
//! the network. [`HttpFetcher`] is the production implementation; tests
//! substitute scripted fetchers.
//!
//! A fetch returns the complete roster or fails. It never returns a partial
//! dataset, and it has no side effects beyond the request itself.

#![warn(missing_docs)]

mod error;
mod http;
mod payload;

pub use error::FetchError;
pub use http::{HttpFetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_SOURCE_URL};
pub use payload::{decode_payload, unwrap_jsonp};

use roster_core::Dataset;

/// Retrieves the current full dataset from an external source.
pub trait SnapshotFetcher: Send + Sync {
    /// Pull the complete roster.
    fn fetch(&self) -> Result<Dataset, FetchError>;

    /// Human-readable description of the source, for logs and status output.
    fn describe(&self) -> String {
        "custom fetcher".to_string()
    }
}
