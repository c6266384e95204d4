//! Freshness state and the values the coordinator hands out

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use roster_core::Timestamp;
use roster_storage::{QueryResult, QueryStore};
use serde::{Deserialize, Serialize};

use crate::error::RefreshError;

/// Coordinator lifecycle.
///
/// `Empty → Loading → Ready`, then `Ready ⇄ Refreshing`. A failed first load
/// returns to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing loaded yet
    Empty,
    /// First load in progress
    Loading,
    /// Serving the installed store
    Ready,
    /// Serving the installed store while a refresh runs
    Refreshing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Empty => "empty",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Refreshing => "refreshing",
        };
        f.write_str(name)
    }
}

/// Where the installed data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Loaded from the snapshot cache at startup
    Cache,
    /// Fetched from upstream
    Network,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Cache => f.write_str("cache"),
            Origin::Network => f.write_str("network"),
        }
    }
}

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Members in the new store
    pub member_count: usize,
    /// Timestamp recorded for the new store
    pub refreshed_at: Timestamp,
    /// False when the snapshot could not be written to the cache
    pub persisted: bool,
    /// Generation of the new store
    pub generation: u64,
}

/// Result of a query, with the freshness of the data it ran on.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Rows
    pub result: QueryResult,
    /// Last-refresh timestamp of the store the query ran on
    pub refreshed_at: Timestamp,
    /// Set when this query triggered a refresh that failed; the rows come
    /// from the previous store
    pub refresh_error: Option<RefreshError>,
}

/// Coordinator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorMetrics {
    /// Upstream fetches started
    pub fetches: u64,
    /// Fetches that ended with a new store installed
    pub refreshes_succeeded: u64,
    /// Fetches or builds that failed
    pub refreshes_failed: u64,
    /// Snapshots that could not be written to the cache
    pub persistence_failures: u64,
    /// Queries answered, including failed ones
    pub queries: u64,
    /// Statements refused as not read-only
    pub rejected_queries: u64,
}

/// Point-in-time view of the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorStatus {
    /// Lifecycle phase
    pub phase: Phase,
    /// Members in the installed store
    pub member_count: Option<usize>,
    /// Last-refresh timestamp of the installed store
    pub refreshed_at: Option<Timestamp>,
    /// Age of the installed store
    pub age: Option<Duration>,
    /// True when the next query will refresh
    pub stale: bool,
    /// Where the installed store came from
    pub origin: Option<Origin>,
    /// Generation of the installed store
    pub generation: Option<u64>,
    /// Configured TTL
    pub ttl: Duration,
    /// True while a refresh is running
    pub refresh_in_flight: bool,
    /// Description of the upstream source
    pub source: String,
    /// Snapshot cache file
    pub cache_file: PathBuf,
    /// Counters
    pub metrics: CoordinatorMetrics,
}

impl CoordinatorStatus {
    /// True when the installed store is due for a refresh
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

#[derive(Clone)]
pub(crate) struct Installed {
    pub(crate) store: Arc<QueryStore>,
    pub(crate) refreshed_at: Timestamp,
    /// Clock reading the TTL is measured from. Differs from `refreshed_at`
    /// when the reported timestamp was bumped past a stalled clock.
    pub(crate) measured_from: Timestamp,
    pub(crate) origin: Origin,
    pub(crate) persisted: bool,
}

impl Installed {
    /// Age at `now`, or `None` when `measured_from` is ahead of the clock.
    pub(crate) fn age(&self, now: Timestamp) -> Option<Duration> {
        now.duration_since(self.measured_from)
    }

    /// A cached snapshot stamped ahead of the clock is due at once. A store
    /// fetched by this process is not, even if the clock stepped back.
    pub(crate) fn is_due(&self, now: Timestamp, ttl: Duration) -> bool {
        match self.age(now) {
            Some(age) => age >= ttl,
            None => self.origin == Origin::Cache,
        }
    }

    pub(crate) fn report(&self) -> RefreshReport {
        RefreshReport {
            member_count: self.store.len(),
            refreshed_at: self.refreshed_at,
            persisted: self.persisted,
            generation: self.store.generation(),
        }
    }
}

pub(crate) struct FreshnessState {
    pub(crate) phase: Phase,
    pub(crate) installed: Option<Installed>,
    pub(crate) flight: Option<Arc<RefreshFlight>>,
}

impl FreshnessState {
    pub(crate) fn new() -> Self {
        FreshnessState {
            phase: Phase::Empty,
            installed: None,
            flight: None,
        }
    }
}

/// One in-progress refresh. Joiners block in [`RefreshFlight::wait`].
pub(crate) struct RefreshFlight {
    outcome: Mutex<Option<Result<RefreshReport, RefreshError>>>,
    done: Condvar,
}

impl RefreshFlight {
    pub(crate) fn new() -> Self {
        RefreshFlight {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    /// Publish the outcome and wake every joiner. Only the first call counts.
    pub(crate) fn complete(&self, result: Result<RefreshReport, RefreshError>) {
        let mut outcome = self.outcome.lock();
        if outcome.is_none() {
            *outcome = Some(result);
            self.done.notify_all();
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.outcome.lock().is_some()
    }

    pub(crate) fn wait(&self) -> Result<RefreshReport, RefreshError> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut outcome);
        }
    }
}
