//! RosterDB - self-refreshing, read-only SQL view of the SNH48 group roster
//!
//! RosterDB pulls the full member roster from the public endpoint, keeps the
//! last good snapshot on disk, and answers ad-hoc `SELECT` queries against
//! it. Data older than the TTL is re-fetched on the next query; concurrent
//! callers share one fetch, and a failed fetch keeps serving the previous
//! snapshot.
//!
//! # Quick Start
//!
//! ```ignore
//! use rosterdb::{Roster, RosterConfig};
//!
//! let roster = Roster::open(&RosterConfig::default())?;
//! let rows = roster.run_query(
//!     "SELECT sname, tname FROM members WHERE gname = 'SNH' ORDER BY sid",
//! )?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`] which provides a command-based API.
//! The [`Roster`] struct provides a convenient high-level interface. The
//! freshness engine is re-exported for callers that bring their own
//! [`SnapshotFetcher`] or [`Clock`].

// Re-export the public API from roster-executor
pub use roster_executor::*;

pub use roster_core::{Dataset, Record, Snapshot, Timestamp, FIELDS};
pub use roster_engine::{
    Clock, CoordinatorStatus, EngineError, FreshnessCoordinator, ManualClock, QueryOutcome,
    RefreshError, RefreshReport, SystemClock,
};
pub use roster_source::{FetchError, HttpFetcher, SnapshotFetcher};
