//! # Roster Executor
//!
//! The public API for RosterDB - a self-refreshing, read-only SQL view of
//! the SNH48 group roster.
//!
//! It provides:
//! - [`Roster`] - Typed methods: `run_query`, `force_refresh`, `status`, `schema`
//! - [`Command`]/[`Output`] - Serializable command interface (for tools)
//! - [`Error`] - Serializable errors
//!
//! ## Quick Start
//!
//! ```text
//! use roster_executor::Roster;
//!
//! let roster = Roster::open(&RosterConfig::default())?;
//! let rows = roster.run_query(
//!     "SELECT sname FROM members WHERE identifier = '10125'",
//! )?;
//! ```
//!
//! ## Table
//!
//! One table, `members`, with one `TEXT` column per roster attribute
//! (`sid`, `sname`, `tname`, `height`, `birth_day`, ...) and `identifier`
//! as an alias of `sid`. Cast numeric text in SQL, e.g.
//! `CAST(height AS INTEGER)`. [`Command::Schema`] lists every column with
//! its meaning and a few example queries.

#![warn(missing_docs)]

mod command;
mod error;
mod executor;
mod output;
mod roster;
mod types;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;
pub use roster::Roster;
pub use types::*;

// Re-export core types so users don't need roster-core directly
pub use roster_core::{Timestamp, Value};

// Re-export engine types so users don't need roster-engine directly
pub use roster_engine::{CoordinatorMetrics, Origin, Phase, RosterConfig};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
