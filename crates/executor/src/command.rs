//! Command enum defining all roster operations.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON for tool-style callers
//! - **Pure data**: No closures or executable code

use serde::{Deserialize, Serialize};

/// A command is a self-contained, serializable operation.
///
/// | Command | Output |
/// |---------|--------|
/// | `Query` | `Output::Rows` |
/// | `Refresh` | `Output::Refreshed` |
/// | `Status` | `Output::Status` |
/// | `Schema` | `Output::Schema` |
///
/// # Example
///
/// ```
/// use roster_executor::Command;
///
/// let cmd: Command = serde_json::from_str(
///     r#"{"Query":{"sql":"SELECT sname FROM members LIMIT 5"}}"#,
/// ).unwrap();
/// assert_eq!(cmd.name(), "query");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Run a read-only SQL statement against the `members` table.
    /// May trigger a refresh when the data is older than the TTL.
    /// Returns: `Output::Rows`
    Query {
        /// The statement
        sql: String,
    },

    /// Re-fetch the roster now, regardless of age.
    /// Returns: `Output::Refreshed`
    Refresh,

    /// Report freshness state and counters. Never loads or fetches.
    /// Returns: `Output::Status`
    Status,

    /// Describe the `members` table: every column and example queries.
    /// Never loads or fetches.
    /// Returns: `Output::Schema`
    Schema,
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Query { .. } => "query",
            Command::Refresh => "refresh",
            Command::Status => "status",
            Command::Schema => "schema",
        }
    }

    /// Shorthand for `Command::Query`
    pub fn query(sql: impl Into<String>) -> Self {
        Command::Query { sql: sql.into() }
    }
}
