//! Test modules for the executor crate.


use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use roster_core::{Dataset, Record};
use roster_durability::SnapshotCache;
use roster_engine::FreshnessCoordinator;
use roster_source::{FetchError, SnapshotFetcher};
use tempfile::TempDir;

/// Serves a fixed three-member roster and counts calls.
pub(crate) struct FixedFetcher {
    pub(crate) calls: AtomicUsize,
    pub(crate) fail: AtomicBool,
}

impl SnapshotFetcher for FixedFetcher {
    fn fetch(&self) -> Result<Dataset, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status(503));
        }
        let member = |sid: &str, sname: &str, height: &str| Record {
            sid: sid.to_string(),
            sname: sname.to_string(),
            height: height.to_string(),
            tname: "SII".to_string(),
            ..Record::default()
        };
        Ok(Dataset::new(vec![
            member("10125", "刘增艳", "157"),
            member("10126", "段艺璇", "166"),
            member("10127", "许杨玉琢", "163"),
        ])
        .unwrap())
    }

    fn describe(&self) -> String {
        "fixed test roster".to_string()
    }
}

/// A coordinator over [`FixedFetcher`] with its cache in a temp dir.
pub(crate) fn test_coordinator() -> (TempDir, Arc<FixedFetcher>, Arc<FreshnessCoordinator>) {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(FixedFetcher {
        calls: AtomicUsize::new(0),
        fail: AtomicBool::new(false),
    });
    let cache = SnapshotCache::open(dir.path().join("members.json")).unwrap();
    let coordinator =
        FreshnessCoordinator::new(fetcher.clone(), cache, Duration::from_secs(3600));
    (dir, fetcher, Arc::new(coordinator))
}
