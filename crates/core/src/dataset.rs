//! Datasets and snapshots
//!
//! A [`Dataset`] is one complete, validated pull of the roster. A
//! [`Snapshot`] pairs it with the instant it was fetched and is the unit the
//! durable cache persists.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::timestamp::Timestamp;

/// An ordered, validated set of records.
///
/// Construction checks every record's required fields and that identifiers
/// are unique. Once built the records cannot be changed; clones share the
/// same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Arc<[Record]>,
}

impl Dataset {
    /// Validate `records` and wrap them.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            record.validate(position)?;
            if let Some(first) = seen.insert(record.identifier(), position) {
                return Err(Error::DuplicateIdentifier {
                    identifier: record.identifier().to_string(),
                    first,
                    second: position,
                });
            }
        }
        Ok(Dataset {
            records: records.into(),
        })
    }

    /// An empty dataset.
    pub fn empty() -> Self {
        Dataset {
            records: Arc::from(Vec::new()),
        }
    }

    /// Records in source order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by identifier.
    pub fn get(&self, identifier: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.identifier() == identifier)
    }
}

/// A dataset together with the instant it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// When the dataset was pulled from the source
    pub fetched_at: Timestamp,
    /// The pulled records
    pub dataset: Dataset,
}

impl Snapshot {
    /// Create a snapshot
    pub fn new(fetched_at: Timestamp, dataset: Dataset) -> Self {
        Snapshot {
            fetched_at,
            dataset,
        }
    }
}
