//! Anything but a read-only query is refused and changes nothing.

use rosterdb::Error;

use crate::common::*;

const MUTATIONS: &[&str] = &[
    "DELETE FROM members",
    "DROP TABLE members",
    "UPDATE members SET sname = 'x' WHERE sid = '10125'",
    "INSERT INTO members (sid, sname) VALUES ('1', 'x')",
    "REPLACE INTO members (sid, sname) VALUES ('10125', 'x')",
    "CREATE TABLE t (x)",
    "ALTER TABLE members ADD COLUMN x TEXT",
    "ATTACH DATABASE '/tmp/x.db' AS x",
    "PRAGMA query_only = OFF",
    "WITH doomed AS (SELECT sid FROM members) DELETE FROM members",
    "SELECT 1; DELETE FROM members",
    "/* SELECT */ DELETE FROM members",
    "   ",
];

#[test]
fn mutating_statements_are_rejected() {
    let h = Harness::new(3600);
    let roster = h.roster();
    member_count(&roster);
    let before = roster.status().unwrap();

    for sql in MUTATIONS {
        let err = roster.run_query(sql).unwrap_err();
        assert!(
            matches!(err, Error::RejectedQuery { .. }),
            "{:?} -> {:?}",
            sql,
            err
        );
    }

    assert_eq!(member_count(&roster), version_size(1));
    let rows = roster
        .run_query("SELECT sname FROM members WHERE sid = '10125'")
        .unwrap();
    assert_eq!(rows.rows, vec![vec![Value::from("刘增艳")]]);

    let after = roster.status().unwrap();
    assert_eq!(after.refreshed_at, before.refreshed_at);
    assert_eq!(after.metrics.rejected_queries, MUTATIONS.len() as u64);
    assert_eq!(h.fetcher.calls(), 1);
}

#[test]
fn rejection_happens_before_any_load() {
    let h = Harness::new(3600);
    let roster = h.roster();

    let err = roster.run_query("DELETE FROM members").unwrap_err();
    assert!(matches!(err, Error::RejectedQuery { reason } if reason.contains("DELETE")));
    assert_eq!(h.fetcher.calls(), 0);
    assert!(!h.cache_path().exists());
}

#[test]
fn rejection_does_not_trigger_due_refresh() {
    let h = Harness::new(60);
    let roster = h.roster();
    member_count(&roster);
    h.advance_secs(120);

    roster.run_query("DROP TABLE members").unwrap_err();
    assert_eq!(h.fetcher.calls(), 1);
}

#[test]
fn read_only_forms_are_accepted() {
    let h = Harness::new(3600);
    let roster = h.roster();

    for sql in [
        "select count(*) from members",
        "  -- leading comment\n SELECT sid FROM members",
        "WITH t AS (SELECT tname FROM members) SELECT tname, COUNT(*) FROM t GROUP BY tname",
        "SELECT sname FROM members WHERE sname = 'DELETE FROM members'",
        "SELECT sid FROM members;",
    ] {
        assert!(roster.run_query(sql).is_ok(), "{:?}", sql);
    }
}
