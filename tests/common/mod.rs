//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use roster_durability::SnapshotCache;
pub use rosterdb::{
    Dataset, FetchError, FreshnessCoordinator, ManualClock, Record, Roster, SnapshotFetcher,
    Timestamp, Value,
};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

/// Members present in every scripted roster.
pub const BASE_MEMBERS: usize = 3;

pub fn member(sid: &str, sname: &str, team: &str, height: &str) -> Record {
    Record {
        sid: sid.to_string(),
        sname: sname.to_string(),
        gname: "SNH".to_string(),
        tname: team.to_string(),
        height: height.to_string(),
        ..Record::default()
    }
}

/// Roster returned by the `n`th successful fetch: the base members plus `n`
/// trainees, so every version has a distinct size.
pub fn roster_version(n: usize) -> Dataset {
    let mut records = vec![
        member("10125", "刘增艳", "SII", "157"),
        member("10126", "段艺璇", "SII", "166"),
        member("10201", "王晓佳", "HII", "163"),
    ];
    for i in 0..n {
        records.push(member(
            &format!("9{:04}", i),
            &format!("trainee {}", i),
            "X",
            "160",
        ));
    }
    Dataset::new(records).unwrap()
}

/// Row count of the `n`th roster version.
pub fn version_size(n: usize) -> usize {
    BASE_MEMBERS + n
}

// ============================================================================
// FetchGate - parks fetches until released
// ============================================================================

#[derive(Default)]
struct GateState {
    closed: bool,
    entered: usize,
}

/// Blocks fetches inside the fetcher until the test opens it.
#[derive(Default)]
pub struct FetchGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl FetchGate {
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn open(&self) {
        self.state.lock().closed = false;
        self.changed.notify_all();
    }

    /// Block until `n` fetches have reached the gate.
    pub fn wait_for_entered(&self, n: usize) {
        let mut state = self.state.lock();
        while state.entered < n {
            self.changed.wait(&mut state);
        }
    }

    fn pass(&self) {
        let mut state = self.state.lock();
        state.entered += 1;
        self.changed.notify_all();
        while state.closed {
            self.changed.wait(&mut state);
        }
    }
}

// ============================================================================
// ScriptedFetcher
// ============================================================================

/// Test double for the upstream source.
///
/// Counts calls, can be switched to fail, and can be parked on a gate.
#[derive(Default)]
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    successes: AtomicUsize,
    fail: AtomicBool,
    pub gate: FetchGate,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fetch calls so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotFetcher for ScriptedFetcher {
    fn fetch(&self) -> Result<Dataset, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass();
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection refused".into()));
        }
        let n = self.successes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(roster_version(n))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Coordinator wired to a scripted fetcher, a manual clock and a temp cache.
pub struct Harness {
    pub dir: TempDir,
    pub fetcher: Arc<ScriptedFetcher>,
    pub clock: Arc<ManualClock>,
    pub coordinator: Arc<FreshnessCoordinator>,
    pub ttl: Duration,
}

impl Harness {
    /// Clock starts at t=0.
    pub fn new(ttl_secs: u64) -> Self {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new();
        let clock = Arc::new(ManualClock::new(Timestamp::EPOCH));
        let ttl = Duration::from_secs(ttl_secs);
        let coordinator = Self::coordinator_at(&dir, fetcher.clone(), clock.clone(), ttl);
        Harness {
            dir,
            fetcher,
            clock,
            coordinator,
            ttl,
        }
    }

    fn coordinator_at(
        dir: &TempDir,
        fetcher: Arc<ScriptedFetcher>,
        clock: Arc<ManualClock>,
        ttl: Duration,
    ) -> Arc<FreshnessCoordinator> {
        let cache = SnapshotCache::open(dir.path().join("roster_members.json")).unwrap();
        Arc::new(FreshnessCoordinator::new(fetcher, cache, ttl).with_clock(clock))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join("roster_members.json")
    }

    pub fn roster(&self) -> Roster {
        Roster::new(Arc::clone(&self.coordinator))
    }

    /// A second coordinator over the same cache file, as after a restart.
    pub fn restart(&self, fetcher: Arc<ScriptedFetcher>) -> Arc<FreshnessCoordinator> {
        Self::coordinator_at(&self.dir, fetcher, Arc::clone(&self.clock), self.ttl)
    }

    pub fn advance_secs(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }

    pub fn set_time_secs(&self, secs: u64) {
        self.clock.set(Timestamp::from_secs(secs));
    }
}

/// Row count through the coordinator (may refresh).
pub fn member_count(roster: &Roster) -> usize {
    let result = roster.run_query("SELECT COUNT(*) FROM members").unwrap();
    match &result.rows[0][0] {
        Value::Int(n) => *n as usize,
        other => panic!("unexpected count {:?}", other),
    }
}
