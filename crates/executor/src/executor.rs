//! The Executor - single entry point to the freshness engine.
//!
//! The Executor is a stateless dispatcher that routes commands to the
//! coordinator and converts results to outputs.

use std::sync::Arc;
use std::time::Instant;

use roster_engine::{EngineError, FreshnessCoordinator};
use tracing::debug;

use crate::types::{QueryRows, RefreshSummary, SchemaInfo, StatusInfo};
use crate::{Command, Error, Output, Result};

/// The command executor.
///
/// The Executor is **stateless**: it holds a reference to the coordinator
/// but maintains no state of its own.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use roster_executor::{Command, Executor};
///
/// let executor = Executor::new(coordinator);
/// let result = executor.execute(Command::query("SELECT COUNT(*) FROM members"))?;
/// ```
pub struct Executor {
    coordinator: Arc<FreshnessCoordinator>,
}

impl Executor {
    /// Create a new executor wrapping a coordinator.
    pub fn new(coordinator: Arc<FreshnessCoordinator>) -> Self {
        Self { coordinator }
    }

    /// The wrapped coordinator
    pub fn coordinator(&self) -> &Arc<FreshnessCoordinator> {
        &self.coordinator
    }

    /// Execute a single command.
    ///
    /// Returns the command result or an error.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        let started = Instant::now();
        let name = cmd.name();

        let result = match cmd {
            Command::Query { sql } => self
                .coordinator
                .query(&sql)
                .map(|outcome| Output::Rows(QueryRows::from(outcome))),
            Command::Refresh => self
                .coordinator
                .force_refresh()
                .map(|report| Output::Refreshed(RefreshSummary::from(report))),
            Command::Status => Ok(Output::Status(StatusInfo::from(self.coordinator.status()))),
            Command::Schema => Ok(Output::Schema(SchemaInfo::members())),
        };

        debug!(
            target: "roster::executor",
            command = name,
            ok = result.is_ok(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Executed command"
        );
        result.map_err(|e| self.to_error(e))
    }

    /// A failed refresh also reports what is still being served.
    fn to_error(&self, e: EngineError) -> Error {
        match e {
            EngineError::Refresh(e) => Error::RefreshFailed {
                reason: e.to_string(),
                member_count: self.coordinator.current_store().map(|store| store.len()),
            },
            e => e.into(),
        }
    }

    /// Execute commands in order, one result per command.
    ///
    /// A failing command does not stop the ones after it.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }
}
