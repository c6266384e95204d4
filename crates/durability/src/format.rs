//! On-disk snapshot format
//!
//! The cache file is pretty-printed JSON so it can be inspected by hand:
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "fetched_at": 1718000000000000,
//!   "rows": [ { "sid": "10125", "sname": "刘增艳", ... }, ... ]
//! }
//! ```
//!
//! A raw upstream dump (`{"rows": [...]}` without the two header fields) is
//! also accepted. It loads with `fetched_at = 0`, which makes it stale on the
//! first TTL check.

use roster_core::{Record, Timestamp};
use serde::{Deserialize, Serialize};

/// Current snapshot file format version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Borrowing view used when writing.
#[derive(Serialize)]
pub(crate) struct SnapshotFileRef<'a> {
    pub format_version: u32,
    pub fetched_at: Timestamp,
    pub rows: &'a [Record],
}

/// Owned form used when reading.
#[derive(Deserialize)]
pub(crate) struct SnapshotFile {
    #[serde(default)]
    pub format_version: Option<u32>,
    #[serde(default)]
    pub fetched_at: Timestamp,
    pub rows: Vec<Record>,
}
