//! At most one refresh runs at a time; concurrent triggers share it.

use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosterdb::{EngineError, RefreshError, RefreshReport};

use crate::common::*;

fn spawn_forced(h: &Harness, n: usize) -> Vec<JoinHandle<Result<RefreshReport, EngineError>>> {
    (0..n)
        .map(|_| {
            let coordinator = Arc::clone(&h.coordinator);
            thread::spawn(move || coordinator.force_refresh())
        })
        .collect()
}

/// Give spawned callers time to find the parked flight.
fn settle() {
    thread::sleep(Duration::from_millis(100));
}

#[test]
fn two_forced_refreshes_on_empty_fetch_once() {
    let h = Harness::new(3600);
    h.fetcher.gate.close();
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let coordinator = Arc::clone(&h.coordinator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                coordinator.force_refresh()
            })
        })
        .collect();

    h.fetcher.gate.wait_for_entered(1);
    settle();
    h.fetcher.gate.open();

    let reports: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    assert_eq!(h.fetcher.calls(), 1);
    assert_eq!(reports[0], reports[1]);
    assert_eq!(reports[0].member_count, version_size(1));
}

#[test]
fn forced_refreshes_join_running_flight() {
    let h = Harness::new(3600);
    h.roster().force_refresh().unwrap();

    h.fetcher.gate.close();
    let handles = spawn_forced(&h, 4);
    h.fetcher.gate.wait_for_entered(2);
    settle();
    h.fetcher.gate.open();

    let reports: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    assert_eq!(h.fetcher.calls(), 2);
    for report in &reports {
        assert_eq!(report, &reports[0]);
        assert_eq!(report.member_count, version_size(2));
    }
    assert_eq!(h.coordinator.metrics().fetches, 2);
}

#[test]
fn joiners_share_failed_outcome() {
    let h = Harness::new(3600);
    h.roster().force_refresh().unwrap();
    let before = h.coordinator.refreshed_at();

    h.fetcher.set_failing(true);
    h.fetcher.gate.close();
    let handles = spawn_forced(&h, 3);
    h.fetcher.gate.wait_for_entered(2);
    settle();
    h.fetcher.gate.open();

    for handle in handles {
        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(err, EngineError::Refresh(RefreshError::Fetch(_))));
    }
    assert_eq!(h.fetcher.calls(), 2);
    assert_eq!(h.coordinator.refreshed_at(), before);
}

#[test]
fn ttl_queries_during_flight_serve_stale_without_fetching() {
    let h = Harness::new(60);
    let roster = h.roster();
    member_count(&roster);
    h.advance_secs(120);

    h.fetcher.gate.close();
    let coordinator = Arc::clone(&h.coordinator);
    let leader = thread::spawn(move || coordinator.query("SELECT COUNT(*) FROM members"));
    h.fetcher.gate.wait_for_entered(2);

    // These return while the leader is still parked in its fetch.
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = Arc::clone(&h.coordinator);
            thread::spawn(move || coordinator.query("SELECT COUNT(*) FROM members").unwrap())
        })
        .collect();
    for reader in readers {
        let outcome = reader.join().unwrap();
        assert_eq!(
            outcome.result.rows,
            vec![vec![Value::Int(version_size(1) as i64)]]
        );
        assert!(outcome.refresh_error.is_none());
    }
    assert_eq!(h.fetcher.calls(), 2);

    h.fetcher.gate.open();
    let outcome = leader.join().unwrap().unwrap();
    assert_eq!(
        outcome.result.rows,
        vec![vec![Value::Int(version_size(2) as i64)]]
    );
    assert_eq!(h.fetcher.calls(), 2);
}

#[test]
fn concurrent_ttl_queries_trigger_one_fetch() {
    const CALLERS: usize = 8;

    let h = Harness::new(60);
    member_count(&h.roster());
    h.advance_secs(61);

    let barrier = Arc::new(Barrier::new(CALLERS));
    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let roster = h.roster();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                member_count(&roster)
            })
        })
        .collect();
    for handle in handles {
        let n = handle.join().unwrap();
        assert!(n == version_size(1) || n == version_size(2));
    }

    assert_eq!(h.fetcher.calls(), 2);
    assert_eq!(member_count(&h.roster()), version_size(2));
}
