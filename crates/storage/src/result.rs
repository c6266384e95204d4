//! Query limits and results

use std::time::Duration;

use roster_core::Value;
use serde::Serialize;

/// Default maximum number of rows a single query may return.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Default wall-clock budget for a single query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-query resource limits, fixed when a store is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    /// Queries producing more rows than this fail with `LimitExceeded`
    pub max_rows: usize,
    /// Queries running longer than this are interrupted
    pub timeout: Duration,
}

impl Default for QueryLimits {
    fn default() -> Self {
        QueryLimits {
            max_rows: DEFAULT_MAX_ROWS,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Rows produced by one query.
///
/// Each row has exactly one value per entry in `columns`, in the same order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryResult {
    /// Column names as the statement produced them
    pub columns: Vec<String>,
    /// Result rows in engine order
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the query produced no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` in the column called `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row)?.get(index)
    }
}
