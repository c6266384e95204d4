//! Fetches happen only when the snapshot is at least TTL old, or on demand.

use std::time::Duration;

use rosterdb::{Origin, Timestamp};

use crate::common::*;

#[test]
fn within_ttl_no_fetch() {
    let h = Harness::new(3600);
    let roster = h.roster();
    member_count(&roster);

    for t in [1, 600, 3599] {
        h.set_time_secs(t);
        member_count(&roster);
    }
    assert_eq!(h.fetcher.calls(), 1);
}

#[test]
fn refresh_due_exactly_at_ttl() {
    let h = Harness::new(3600);
    let roster = h.roster();
    member_count(&roster);

    h.set_time_secs(3600);
    assert_eq!(member_count(&roster), version_size(2));
    assert_eq!(h.fetcher.calls(), 2);

    // The new snapshot is fresh again.
    h.set_time_secs(3601);
    member_count(&roster);
    assert_eq!(h.fetcher.calls(), 2);
}

#[test]
fn zero_ttl_refreshes_on_every_query() {
    let h = Harness::new(0);
    let roster = h.roster();
    for expected in 1..=3 {
        assert_eq!(member_count(&roster), version_size(expected));
    }
    assert_eq!(h.fetcher.calls(), 3);
}

#[test]
fn forced_refresh_ignores_ttl() {
    let h = Harness::new(3600);
    let roster = h.roster();
    member_count(&roster);

    h.set_time_secs(5);
    let summary = roster.force_refresh().unwrap();
    assert_eq!(summary.member_count, version_size(2));
    assert_eq!(summary.refreshed_at, Timestamp::from_secs(5).as_micros());
    assert_eq!(h.fetcher.calls(), 2);
}

#[test]
fn status_never_fetches() {
    let h = Harness::new(60);
    let roster = h.roster();
    assert_eq!(roster.status().unwrap().member_count, None);
    member_count(&roster);

    h.advance_secs(600);
    let status = roster.status().unwrap();
    assert!(status.stale);
    assert_eq!(status.age_secs, Some(600));
    assert_eq!(status.origin, Some(Origin::Network));
    assert_eq!(h.fetcher.calls(), 1);
}

#[test]
fn refresh_timestamps_strictly_increase() {
    let h = Harness::new(3600);
    let roster = h.roster();
    h.set_time_secs(100);

    let first = roster.force_refresh().unwrap().refreshed_at;
    let second = roster.force_refresh().unwrap().refreshed_at;
    assert_eq!(second, first + 1);

    // Clock stepping backwards still moves the timestamp forward.
    h.set_time_secs(50);
    let third = roster.force_refresh().unwrap().refreshed_at;
    assert_eq!(third, second + 1);

    h.clock.advance(Duration::from_secs(100));
    let fourth = roster.force_refresh().unwrap().refreshed_at;
    assert_eq!(fourth, Timestamp::from_secs(150).as_micros());
}

#[test]
fn cache_stamped_ahead_of_clock_does_not_disable_ttl() {
    let h = Harness::new(3600);
    h.set_time_secs(100_000);
    h.roster().force_refresh().unwrap();

    // Restart on a host whose clock is far behind the cached timestamp.
    h.set_time_secs(0);
    let fetcher = ScriptedFetcher::new();
    let roster = Roster::new(h.restart(fetcher.clone()));

    let summary = roster.force_refresh().unwrap();
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(summary.refreshed_at, Timestamp::EPOCH.as_micros());

    h.set_time_secs(3599);
    member_count(&roster);
    assert_eq!(fetcher.calls(), 1);

    h.set_time_secs(7200);
    member_count(&roster);
    assert_eq!(fetcher.calls(), 2);
}

#[test]
fn cache_stamped_ahead_of_clock_refreshes_on_first_query() {
    let h = Harness::new(3600);
    h.set_time_secs(100_000);
    h.roster().force_refresh().unwrap();

    h.set_time_secs(10);
    let fetcher = ScriptedFetcher::new();
    let roster = Roster::new(h.restart(fetcher.clone()));

    let rows = roster.run_query("SELECT COUNT(*) FROM members").unwrap();
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(rows.refreshed_at, Timestamp::from_secs(10).as_micros());
    assert_eq!(roster.status().unwrap().origin, Some(Origin::Network));
}

#[test]
fn clock_step_back_does_not_postpone_ttl() {
    let h = Harness::new(3600);
    let roster = h.roster();
    h.set_time_secs(1_000);
    roster.force_refresh().unwrap();

    h.set_time_secs(10);
    roster.force_refresh().unwrap();
    assert_eq!(h.fetcher.calls(), 2);

    // Due one TTL after the refresh by the stepped-back clock.
    h.set_time_secs(3_610);
    member_count(&roster);
    assert_eq!(h.fetcher.calls(), 3);
}
