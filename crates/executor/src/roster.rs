//! High-level typed wrapper for the Executor.
//!
//! The [`Roster`] struct provides a convenient Rust API that wraps the
//! [`Executor`] and [`Command`]/[`Output`] enums with typed method calls.
//!
//! # Example
//!
//! ```ignore
//! use roster_executor::Roster;
//!
//! let roster = Roster::open(&RosterConfig::load(Path::new("roster.toml"))?)?;
//! let rows = roster.run_query("SELECT sname FROM members WHERE tname = 'SII'")?;
//! ```

use std::sync::Arc;

use roster_engine::{FreshnessCoordinator, RosterConfig};

use crate::types::*;
use crate::{Command, Error, Executor, Output, Result};

/// High-level typed wrapper for roster operations.
///
/// Each method:
///
/// 1. Creates the appropriate [`Command`]
/// 2. Executes it via the [`Executor`]
/// 3. Extracts and returns the typed result
pub struct Roster {
    executor: Executor,
}

impl Roster {
    /// Create a new Roster over the given coordinator.
    pub fn new(coordinator: Arc<FreshnessCoordinator>) -> Self {
        Self {
            executor: Executor::new(coordinator),
        }
    }

    /// Create a Roster fetching over HTTP as configured.
    ///
    /// Nothing is loaded until the first query or refresh.
    pub fn open(config: &RosterConfig) -> Result<Self> {
        let coordinator = FreshnessCoordinator::from_config(config)?;
        Ok(Self::new(Arc::new(coordinator)))
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Run a read-only SQL statement against the `members` table.
    pub fn run_query(&self, sql: &str) -> Result<QueryRows> {
        match self.executor.execute(Command::query(sql))? {
            Output::Rows(rows) => Ok(rows),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Query".into(),
            }),
        }
    }

    /// Re-fetch the roster now.
    pub fn force_refresh(&self) -> Result<RefreshSummary> {
        match self.executor.execute(Command::Refresh)? {
            Output::Refreshed(summary) => Ok(summary),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Refresh".into(),
            }),
        }
    }

    /// Columns of the `members` table and example queries.
    pub fn schema(&self) -> Result<SchemaInfo> {
        match self.executor.execute(Command::Schema)? {
            Output::Schema(schema) => Ok(schema),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Schema".into(),
            }),
        }
    }

    /// Freshness state and counters.
    pub fn status(&self) -> Result<StatusInfo> {
        match self.executor.execute(Command::Status)? {
            Output::Status(status) => Ok(status),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Status".into(),
            }),
        }
    }
}
