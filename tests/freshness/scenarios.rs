//! End-to-end walkthroughs of the documented behavior.

use std::sync::Arc;

use rosterdb::{Command, Executor, Output};

use crate::common::*;

#[test]
fn ttl_walkthrough() {
    let h = Harness::new(3600);
    let roster = h.roster();

    // Refresh at t=0.
    roster.force_refresh().unwrap();
    assert_eq!(h.fetcher.calls(), 1);

    // t=100: fresh, no fetch.
    h.set_time_secs(100);
    member_count(&roster);
    assert_eq!(h.fetcher.calls(), 1);

    // t=4000: stale, exactly one fetch before answering.
    h.set_time_secs(4000);
    let rows = roster
        .run_query("SELECT sname FROM members WHERE identifier = '10125'")
        .unwrap();
    assert_eq!(h.fetcher.calls(), 2);
    assert_eq!(rows.rows, vec![vec![Value::from("刘增艳")]]);
    assert_eq!(rows.refreshed_at, Timestamp::from_secs(4000).as_micros());
}

#[test]
fn command_interface_session() {
    let h = Harness::new(3600);
    let executor = Executor::new(Arc::clone(&h.coordinator));

    let commands: Vec<Command> = serde_json::from_str(
        r#"[
            "Status",
            {"Query": {"sql": "SELECT tname, COUNT(*) AS n FROM members WHERE gname = 'SNH' GROUP BY tname ORDER BY tname"}},
            "Refresh",
            "Status"
        ]"#,
    )
    .unwrap();
    let results = executor.execute_many(commands);

    match &results[0] {
        Ok(Output::Status(status)) => assert_eq!(status.member_count, None),
        other => panic!("Expected Status output, got {:?}", other),
    }
    match &results[1] {
        Ok(Output::Rows(rows)) => {
            let json = serde_json::to_value(rows.to_objects()).unwrap();
            assert_eq!(
                json,
                serde_json::json!([
                    {"tname": "HII", "n": 1},
                    {"tname": "SII", "n": 2},
                    {"tname": "X", "n": 1},
                ])
            );
        }
        other => panic!("Expected Rows output, got {:?}", other),
    }
    match &results[2] {
        Ok(Output::Refreshed(summary)) => assert_eq!(summary.member_count, version_size(2)),
        other => panic!("Expected Refreshed output, got {:?}", other),
    }
    match &results[3] {
        Ok(Output::Status(status)) => {
            assert_eq!(status.member_count, Some(version_size(2)));
            assert_eq!(status.metrics.fetches, 2);
        }
        other => panic!("Expected Status output, got {:?}", other),
    }
}
