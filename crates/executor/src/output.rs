//! Output enum for command execution results.
//!
//! Every command produces exactly one output type. This mapping is deterministic:
//! the same command always produces the same output variant (though the values
//! depend on the data being served).

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Successful command execution results.
///
/// Each [`Command`](crate::Command) variant maps to exactly one `Output` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Query result rows
    Rows(QueryRows),

    /// Refresh completed and new data installed
    Refreshed(RefreshSummary),

    /// Freshness state and counters
    Status(StatusInfo),

    /// Table description
    Schema(SchemaInfo),
}
