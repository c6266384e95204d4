//! Freshness coordinator
//!
//! Decides when the roster is re-fetched and swaps in new query stores
//! without disturbing readers.
//!
//! # Locking
//!
//! `state` guards the installed store, its timestamp and the in-flight
//! refresh. It is held only to check-and-set the flight, to install a new
//! store, and to clone the store handle. Fetching, building, saving and
//! query execution all happen with no lock held.
//!
//! `load_gate` serializes the first load so concurrent first callers do not
//! each hit the network.
//!
//! # Refresh rules
//!
//! - At most one refresh runs at a time. Its leader clears the flight and
//!   installs the result in the same critical section.
//! - A query finding the store older than the TTL leads a refresh if none
//!   is running, otherwise it reads the installed store without waiting.
//! - A forced refresh joins a running refresh and returns its outcome.
//! - A failed refresh leaves the installed store and timestamp untouched.
//!
//! # Memory Ordering
//!
//! Metric counters use Relaxed ordering; they are observational only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use roster_core::{Snapshot, Timestamp};
use roster_durability::SnapshotCache;
use roster_security::{classify, StatementClass};
use roster_source::{HttpFetcher, SnapshotFetcher};
use roster_storage::{QueryLimits, QueryStore};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RosterConfig;
use crate::error::{EngineError, EngineResult, RefreshError};
use crate::state::{
    CoordinatorMetrics, CoordinatorStatus, FreshnessState, Installed, Origin, Phase,
    QueryOutcome, RefreshFlight, RefreshReport,
};

/// Owns the installed query store and keeps it fresh.
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct FreshnessCoordinator {
    fetcher: Arc<dyn SnapshotFetcher>,
    cache: SnapshotCache,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    limits: QueryLimits,
    state: Mutex<FreshnessState>,
    load_gate: Mutex<()>,
    fetches: AtomicU64,
    refreshes_succeeded: AtomicU64,
    refreshes_failed: AtomicU64,
    persistence_failures: AtomicU64,
    queries: AtomicU64,
    rejected_queries: AtomicU64,
}

/// What the first-load step did for the calling thread.
enum FirstLoad {
    /// Data was already installed when the call started
    AlreadyReady(Installed),
    /// Installed during this call, by this thread or one it waited for
    Installed(Installed),
}

impl FirstLoad {
    fn into_installed(self) -> Installed {
        match self {
            FirstLoad::AlreadyReady(installed) | FirstLoad::Installed(installed) => installed,
        }
    }
}

/// Clears an unfinished flight if its leader unwinds.
struct FlightGuard<'a> {
    coordinator: &'a FreshnessCoordinator,
    flight: Arc<RefreshFlight>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.flight.is_complete() {
            return;
        }
        {
            let mut state = self.coordinator.state.lock();
            if state
                .flight
                .as_ref()
                .map_or(false, |f| Arc::ptr_eq(f, &self.flight))
            {
                state.flight = None;
                state.phase = Phase::Ready;
            }
        }
        self.flight.complete(Err(RefreshError::Aborted));
    }
}

impl FreshnessCoordinator {
    /// Create a coordinator using the system clock and default query limits.
    ///
    /// Nothing is loaded until the first query or refresh.
    pub fn new(fetcher: Arc<dyn SnapshotFetcher>, cache: SnapshotCache, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache,
            clock: Arc::new(SystemClock),
            ttl,
            limits: QueryLimits::default(),
            state: Mutex::new(FreshnessState::new()),
            load_gate: Mutex::new(()),
            fetches: AtomicU64::new(0),
            refreshes_succeeded: AtomicU64::new(0),
            refreshes_failed: AtomicU64::new(0),
            persistence_failures: AtomicU64::new(0),
            queries: AtomicU64::new(0),
            rejected_queries: AtomicU64::new(0),
        }
    }

    /// Build a coordinator from configuration, fetching over HTTP.
    pub fn from_config(config: &RosterConfig) -> EngineResult<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.source_url.clone(), config.fetch_timeout());
        let cache = SnapshotCache::open(&config.cache_file)?;
        Ok(Self::new(Arc::new(fetcher), cache, config.ttl()).with_limits(config.query_limits()))
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the limits used for stores built from now on
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configured TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Last-refresh timestamp of the installed store
    pub fn refreshed_at(&self) -> Option<Timestamp> {
        self.state.lock().installed.as_ref().map(|i| i.refreshed_at)
    }

    /// Handle to the installed store, without any freshness check.
    pub fn current_store(&self) -> Option<Arc<QueryStore>> {
        self.state.lock().installed.as_ref().map(|i| Arc::clone(&i.store))
    }

    /// Run a read-only statement against fresh enough data.
    ///
    /// Loads on first use and refreshes when the installed store is older
    /// than the TTL. A failed TTL refresh does not fail the query: the rows
    /// come from the previous store and the failure is in
    /// [`QueryOutcome::refresh_error`].
    pub fn query(&self, sql: &str) -> EngineResult<QueryOutcome> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        if let StatementClass::Rejected(reason) = classify(sql) {
            self.rejected_queries.fetch_add(1, Ordering::Relaxed);
            debug!(target: "roster::engine", %reason, "Rejected statement");
            return Err(EngineError::Rejected(reason.to_string()));
        }

        // Data fetched by the first load is fresh; a cached snapshot still
        // goes through the TTL check.
        let (installed, refresh_error) = match self.ensure_loaded()? {
            FirstLoad::Installed(installed) if installed.origin == Origin::Network => {
                (installed, None)
            }
            loaded => self.installed_for_query(loaded.into_installed()),
        };
        let result = installed.store.query(sql).map_err(|e| {
            if e.is_rejected() {
                self.rejected_queries.fetch_add(1, Ordering::Relaxed);
            }
            EngineError::from(e)
        })?;

        Ok(QueryOutcome {
            result,
            refreshed_at: installed.refreshed_at,
            refresh_error,
        })
    }

    /// Fetch now, regardless of age.
    ///
    /// Joins a refresh that is already running instead of starting a second
    /// one. On an empty coordinator this performs the first load; when that
    /// load already fetched from upstream it counts as the refresh.
    pub fn force_refresh(&self) -> EngineResult<RefreshReport> {
        if let FirstLoad::Installed(installed) = self.ensure_loaded()? {
            if installed.origin == Origin::Network {
                return Ok(installed.report());
            }
        }

        let (flight, leader) = {
            let mut state = self.state.lock();
            match &state.flight {
                Some(flight) => (Arc::clone(flight), false),
                None => (Self::begin_flight(&mut state), true),
            }
        };

        let outcome = if leader {
            self.lead_flight(flight)
        } else {
            debug!(target: "roster::engine", "Joining in-flight refresh");
            flight.wait()
        };
        outcome.map_err(EngineError::Refresh)
    }

    /// Point-in-time status
    pub fn status(&self) -> CoordinatorStatus {
        let now = self.clock.now();
        let state = self.state.lock();
        let installed = state.installed.as_ref();
        CoordinatorStatus {
            phase: state.phase,
            member_count: installed.map(|i| i.store.len()),
            refreshed_at: installed.map(|i| i.refreshed_at),
            age: installed.map(|i| i.age(now).unwrap_or(Duration::ZERO)),
            stale: installed.map_or(false, |i| i.is_due(now, self.ttl)),
            origin: installed.map(|i| i.origin),
            generation: installed.map(|i| i.store.generation()),
            ttl: self.ttl,
            refresh_in_flight: state.flight.is_some(),
            source: self.fetcher.describe(),
            cache_file: self.cache.path().to_path_buf(),
            metrics: self.metrics(),
        }
    }

    /// Counters since construction
    pub fn metrics(&self) -> CoordinatorMetrics {
        CoordinatorMetrics {
            fetches: self.fetches.load(Ordering::Relaxed),
            refreshes_succeeded: self.refreshes_succeeded.load(Ordering::Relaxed),
            refreshes_failed: self.refreshes_failed.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            rejected_queries: self.rejected_queries.load(Ordering::Relaxed),
        }
    }

    fn is_due(&self, installed: &Installed) -> bool {
        installed.is_due(self.clock.now(), self.ttl)
    }

    fn begin_flight(state: &mut FreshnessState) -> Arc<RefreshFlight> {
        let flight = Arc::new(RefreshFlight::new());
        state.flight = Some(Arc::clone(&flight));
        state.phase = Phase::Refreshing;
        flight
    }

    /// Pick the store a query runs on, leading a TTL refresh when due.
    ///
    /// `loaded` is what the caller saw installed; the state can only hold
    /// the same store or a newer one.
    fn installed_for_query(&self, loaded: Installed) -> (Installed, Option<RefreshError>) {
        let (flight, stale) = {
            let mut state = self.state.lock();
            let installed = state.installed.clone().unwrap_or(loaded);
            if !self.is_due(&installed) {
                return (installed, None);
            }
            if state.flight.is_some() {
                debug!(target: "roster::engine", "Refresh in flight; serving installed store");
                return (installed, None);
            }
            (Self::begin_flight(&mut state), installed)
        };

        debug!(target: "roster::engine", "Snapshot past TTL; refreshing");
        let refresh_error = self.lead_flight(flight).err();

        let installed = self.state.lock().installed.clone().unwrap_or(stale);
        (installed, refresh_error)
    }

    /// Run the fetch-build-save sequence for `flight` and publish its outcome.
    fn lead_flight(&self, flight: Arc<RefreshFlight>) -> Result<RefreshReport, RefreshError> {
        let guard = FlightGuard {
            coordinator: self,
            flight: Arc::clone(&flight),
        };

        let outcome = self.fetch_and_build();
        {
            let mut state = self.state.lock();
            if let Ok(installed) = &outcome {
                state.installed = Some(installed.clone());
            }
            state.flight = None;
            state.phase = Phase::Ready;
        }

        let outcome = outcome.map(|installed| installed.report());
        if let Err(e) = &outcome {
            warn!(
                target: "roster::engine",
                error = %e,
                "Refresh failed; keeping previous snapshot"
            );
        }
        flight.complete(outcome.clone());
        drop(guard);
        outcome
    }

    /// Fetch, build and persist a new store. Installs nothing.
    fn fetch_and_build(&self) -> Result<Installed, RefreshError> {
        let started = Instant::now();
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let built = self.fetcher.fetch().map_err(RefreshError::from).and_then(|dataset| {
            QueryStore::build_with_limits(&dataset, self.limits)
                .map(|store| (dataset, store))
                .map_err(RefreshError::from)
        });
        let (dataset, store) = match built {
            Ok(built) => built,
            Err(e) => {
                self.refreshes_failed.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };

        // Only one thread fetches at a time, so the previous timestamp cannot
        // move between here and the install. A cached timestamp may come from
        // another host's clock and is not carried forward.
        let previous = self
            .state
            .lock()
            .installed
            .as_ref()
            .filter(|i| i.origin == Origin::Network)
            .map(|i| i.refreshed_at);
        let now = self.clock.now();
        let refreshed_at = now.strictly_after(previous);

        let persisted = match self.cache.save(&Snapshot::new(refreshed_at, dataset)) {
            Ok(()) => true,
            Err(e) => {
                self.persistence_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    target: "roster::engine",
                    path = %self.cache.path().display(),
                    error = %e,
                    "Failed to persist snapshot; serving it from memory only"
                );
                false
            }
        };

        self.refreshes_succeeded.fetch_add(1, Ordering::Relaxed);
        info!(
            target: "roster::engine",
            members = store.len(),
            generation = store.generation(),
            refreshed_at = %refreshed_at,
            persisted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refreshed roster"
        );

        Ok(Installed {
            store: Arc::new(store),
            refreshed_at,
            measured_from: now,
            origin: Origin::Network,
            persisted,
        })
    }

    /// Install data on first use: the cached snapshot if there is a usable
    /// one, otherwise a fresh fetch.
    fn ensure_loaded(&self) -> EngineResult<FirstLoad> {
        if let Some(installed) = self.state.lock().installed.clone() {
            return Ok(FirstLoad::AlreadyReady(installed));
        }

        let _gate = self.load_gate.lock();
        {
            let mut state = self.state.lock();
            if let Some(installed) = &state.installed {
                return Ok(FirstLoad::Installed(installed.clone()));
            }
            state.phase = Phase::Loading;
        }

        match self.first_load() {
            Ok(installed) => {
                let mut state = self.state.lock();
                state.installed = Some(installed.clone());
                state.phase = Phase::Ready;
                Ok(FirstLoad::Installed(installed))
            }
            Err(e) => {
                self.state.lock().phase = Phase::Empty;
                warn!(target: "roster::engine", error = %e, "First load failed; no data available");
                Err(EngineError::Startup(e))
            }
        }
    }

    fn first_load(&self) -> Result<Installed, RefreshError> {
        match self.cache.load() {
            Ok(Some(snapshot)) => {
                match QueryStore::build_with_limits(&snapshot.dataset, self.limits) {
                    Ok(store) => {
                        info!(
                            target: "roster::engine",
                            members = store.len(),
                            refreshed_at = %snapshot.fetched_at,
                            "Loaded roster from cache"
                        );
                        return Ok(Installed {
                            store: Arc::new(store),
                            refreshed_at: snapshot.fetched_at,
                            measured_from: snapshot.fetched_at,
                            origin: Origin::Cache,
                            persisted: true,
                        });
                    }
                    Err(e) => {
                        warn!(target: "roster::engine", error = %e, "Cached snapshot unusable; fetching")
                    }
                }
            }
            Ok(None) => info!(target: "roster::engine", "No cached snapshot; fetching"),
            Err(e) => warn!(target: "roster::engine", error = %e, "Cached snapshot unreadable; fetching"),
        }
        self.fetch_and_build()
    }
}
