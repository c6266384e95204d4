//! The last good snapshot survives restarts and interrupted saves.

use std::fs;

use roster_durability::SnapshotCache;
use rosterdb::{Origin, Timestamp};

use crate::common::*;

const ALL_ROWS: &str = "SELECT * FROM members ORDER BY sid";

#[test]
fn restart_serves_cached_snapshot_without_network() {
    let h = Harness::new(3600);
    let roster = h.roster();
    let before = roster.run_query(ALL_ROWS).unwrap();

    let offline = ScriptedFetcher::new();
    offline.set_failing(true);
    let restarted = Roster::new(h.restart(offline.clone()));
    let after = restarted.run_query(ALL_ROWS).unwrap();

    assert_eq!(after.columns, before.columns);
    assert_eq!(after.rows, before.rows);
    assert_eq!(after.refreshed_at, before.refreshed_at);
    assert_eq!(offline.calls(), 0);
    assert_eq!(restarted.status().unwrap().origin, Some(Origin::Cache));
}

#[test]
fn stale_cache_on_restart_refreshes_on_first_query() {
    let h = Harness::new(60);
    member_count(&h.roster());

    h.advance_secs(120);
    let fetcher = ScriptedFetcher::new();
    let restarted = Roster::new(h.restart(fetcher.clone()));

    assert_eq!(member_count(&restarted), version_size(1));
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(restarted.status().unwrap().origin, Some(Origin::Network));
}

#[test]
fn stale_cache_with_upstream_down_is_still_served() {
    let h = Harness::new(60);
    member_count(&h.roster());

    h.advance_secs(120);
    let offline = ScriptedFetcher::new();
    offline.set_failing(true);
    let restarted = Roster::new(h.restart(offline.clone()));

    let rows = restarted.run_query("SELECT COUNT(*) FROM members").unwrap();
    assert_eq!(rows.rows, vec![vec![Value::Int(version_size(1) as i64)]]);
    assert!(rows.refresh_error.is_some());
    assert_eq!(offline.calls(), 1);
}

#[test]
fn forced_refresh_after_cache_load_fetches() {
    let h = Harness::new(3600);
    member_count(&h.roster());

    let fetcher = ScriptedFetcher::new();
    let restarted = Roster::new(h.restart(fetcher.clone()));
    let summary = restarted.force_refresh().unwrap();

    assert_eq!(fetcher.calls(), 1);
    assert!(summary.persisted);
    let saved = SnapshotCache::open(h.cache_path()).unwrap().load().unwrap().unwrap();
    assert_eq!(saved.fetched_at.as_micros(), summary.refreshed_at);
}

#[test]
fn corrupt_cache_falls_back_to_fetch() {
    let h = Harness::new(3600);
    fs::write(h.cache_path(), b"{\"rows\": [{\"sid\": ").unwrap();

    assert_eq!(member_count(&h.roster()), version_size(1));
    assert_eq!(h.fetcher.calls(), 1);

    let saved = SnapshotCache::open(h.cache_path()).unwrap().load().unwrap().unwrap();
    assert_eq!(saved.dataset.len(), version_size(1));
}

#[test]
fn interrupted_save_leaves_previous_snapshot() {
    let h = Harness::new(3600);
    let before = h.roster().run_query(ALL_ROWS).unwrap();

    // A crash between writing the temp file and renaming it.
    let temp = h.dir.path().join(".roster_members.json.tmp");
    fs::write(&temp, b"{\"format_version\":1,\"rows\":[").unwrap();

    let offline = ScriptedFetcher::new();
    offline.set_failing(true);
    let restarted = Roster::new(h.restart(offline));

    assert!(!temp.exists());
    assert_eq!(restarted.run_query(ALL_ROWS).unwrap().rows, before.rows);
}

#[test]
fn upstream_dump_as_cache_is_served_but_stale() {
    let h = Harness::new(3600);
    fs::write(
        h.cache_path(),
        r#"{"rows":[{"sid":"10125","sname":"刘增艳","height":157}],"total":1}"#,
    )
    .unwrap();
    h.set_time_secs(10_000);
    h.fetcher.set_failing(true);

    let rows = h
        .roster()
        .run_query("SELECT sname, CAST(height AS INTEGER) FROM members")
        .unwrap();
    assert_eq!(rows.rows, vec![vec![Value::from("刘增艳"), Value::Int(157)]]);
    assert_eq!(rows.refreshed_at, Timestamp::EPOCH.as_micros());
    assert!(rows.refresh_error.is_some());
}

#[test]
fn persistence_failure_still_serves_new_data() {
    let h = Harness::new(3600);
    // A directory where the snapshot file belongs makes every save fail.
    fs::create_dir(h.cache_path()).unwrap();
    let roster = h.roster();

    let summary = roster.force_refresh().unwrap();
    assert!(!summary.persisted);
    assert_eq!(member_count(&roster), version_size(1));
    assert_eq!(roster.status().unwrap().metrics.persistence_failures, 1);

    // Nothing usable on disk, so a restart has to fetch.
    let fetcher = ScriptedFetcher::new();
    let restarted = Roster::new(h.restart(fetcher.clone()));
    assert_eq!(member_count(&restarted), version_size(1));
    assert_eq!(fetcher.calls(), 1);
}
