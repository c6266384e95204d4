//! Readers see the old complete store or the new complete store, never a mix.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use crate::common::*;

#[test]
fn held_store_handle_keeps_old_rows_after_swap() {
    let h = Harness::new(3600);
    let roster = h.roster();
    assert_eq!(member_count(&roster), version_size(1));
    let old = h.coordinator.current_store().unwrap();

    roster.force_refresh().unwrap();

    assert_eq!(member_count(&roster), version_size(2));
    assert_eq!(old.len(), version_size(1));
    assert_eq!(
        old.query("SELECT sid FROM members").unwrap().len(),
        version_size(1)
    );
    assert!(h.coordinator.current_store().unwrap().generation() > old.generation());
}

#[test]
fn readers_see_old_store_until_install() {
    let h = Harness::new(3600);
    let roster = h.roster();
    member_count(&roster);

    h.fetcher.gate.close();
    let coordinator = Arc::clone(&h.coordinator);
    let refresher = thread::spawn(move || coordinator.force_refresh());
    // The first load was the first fetch through the gate.
    h.fetcher.gate.wait_for_entered(2);

    for _ in 0..20 {
        assert_eq!(member_count(&roster), version_size(1));
    }
    assert!(roster.status().unwrap().refresh_in_flight);

    h.fetcher.gate.open();
    let report = refresher.join().unwrap().unwrap();
    assert_eq!(report.member_count, version_size(2));
    assert_eq!(member_count(&roster), version_size(2));
    assert!(!roster.status().unwrap().refresh_in_flight);
}

#[test]
fn concurrent_readers_never_observe_partial_store() {
    const READERS: usize = 6;
    const REFRESHES: usize = 5;

    let h = Harness::new(3600);
    let roster = Arc::new(h.roster());
    member_count(&roster);

    let done = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(READERS + 1));
    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let roster = Arc::clone(&roster);
            let done = Arc::clone(&done);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut last = 0;
                while !done.load(Ordering::SeqCst) {
                    let rows = roster
                        .run_query("SELECT sid, sname FROM members ORDER BY sid")
                        .unwrap();
                    let n = rows.len();
                    assert!(
                        (1..=REFRESHES + 1).any(|v| version_size(v) == n),
                        "observed a store with {} rows",
                        n
                    );
                    assert!(n >= last, "store went back from {} to {} rows", last, n);
                    assert!(rows
                        .column("sname")
                        .unwrap()
                        .contains(&&Value::from("刘增艳")));
                    last = n;
                }
            })
        })
        .collect();

    barrier.wait();
    for _ in 0..REFRESHES {
        roster.force_refresh().unwrap();
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(member_count(&roster), version_size(REFRESHES + 1));
}
