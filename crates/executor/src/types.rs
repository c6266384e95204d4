//! Supporting types for outputs.
//!
//! All types are serializable so outputs can be printed as JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::{Timestamp, Value};
use roster_engine::{CoordinatorMetrics, CoordinatorStatus, Origin, Phase, QueryOutcome, RefreshReport};
use roster_storage::{COLUMN_GUIDE, EXAMPLE_QUERIES, TABLE_NAME};
use serde::{Deserialize, Serialize};

/// Render a timestamp as RFC 3339 UTC, e.g. `2026-10-18T09:30:00Z`.
pub fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts.as_micros())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ts.to_string())
}

// =============================================================================
// Query
// =============================================================================

/// Rows returned by `Command::Query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRows {
    /// Column names in statement order
    pub columns: Vec<String>,
    /// One entry per row, one value per column
    pub rows: Vec<Vec<Value>>,
    /// Last-refresh time of the data, microseconds since the Unix epoch
    pub refreshed_at: u64,
    /// Set when this query triggered a refresh that failed; the rows are
    /// from the previous snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

impl QueryRows {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no rows matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the column called `name`, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// Rows as JSON objects keyed by column name.
    ///
    /// A column name repeated in the statement keeps its last value.
    pub fn to_objects(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| {
                        let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                        (column.clone(), json)
                    })
                    .collect()
            })
            .collect()
    }
}

impl From<QueryOutcome> for QueryRows {
    fn from(outcome: QueryOutcome) -> Self {
        QueryRows {
            columns: outcome.result.columns,
            rows: outcome.result.rows,
            refreshed_at: outcome.refreshed_at.as_micros(),
            refresh_error: outcome.refresh_error.map(|e| e.to_string()),
        }
    }
}

// =============================================================================
// Refresh
// =============================================================================

/// Result of `Command::Refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    /// Members now served
    pub member_count: usize,
    /// New last-refresh time, microseconds since the Unix epoch
    pub refreshed_at: u64,
    /// False when the snapshot could not be written to the cache file
    pub persisted: bool,
    /// Query store generation now served
    pub generation: u64,
}

impl From<RefreshReport> for RefreshSummary {
    fn from(report: RefreshReport) -> Self {
        RefreshSummary {
            member_count: report.member_count,
            refreshed_at: report.refreshed_at.as_micros(),
            persisted: report.persisted,
            generation: report.generation,
        }
    }
}

// =============================================================================
// Status
// =============================================================================

/// Result of `Command::Status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Lifecycle phase
    pub phase: Phase,
    /// Members currently served
    pub member_count: Option<usize>,
    /// Last-refresh time, microseconds since the Unix epoch
    pub refreshed_at: Option<u64>,
    /// Last-refresh time as RFC 3339
    pub refreshed_at_utc: Option<String>,
    /// Whole seconds since the last refresh
    pub age_secs: Option<u64>,
    /// Configured TTL in seconds
    pub ttl_secs: u64,
    /// True when the next query will refresh
    pub stale: bool,
    /// True while a refresh is running
    pub refresh_in_flight: bool,
    /// Where the served data came from
    pub origin: Option<Origin>,
    /// Upstream source
    pub source: String,
    /// Snapshot cache file
    pub cache_file: String,
    /// Coordinator counters
    pub metrics: CoordinatorMetrics,
}

impl From<CoordinatorStatus> for StatusInfo {
    fn from(status: CoordinatorStatus) -> Self {
        StatusInfo {
            phase: status.phase,
            member_count: status.member_count,
            refreshed_at: status.refreshed_at.map(|ts| ts.as_micros()),
            refreshed_at_utc: status.refreshed_at.map(format_timestamp),
            age_secs: status.age.map(|age| age.as_secs()),
            ttl_secs: status.ttl.as_secs(),
            stale: status.is_stale(),
            refresh_in_flight: status.refresh_in_flight,
            origin: status.origin,
            source: status.source,
            cache_file: status.cache_file.display().to_string(),
            metrics: status.metrics,
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// One documented column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Meaning, value format and sentinel values
    pub description: String,
}

/// One example statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleInfo {
    /// What the query answers
    pub description: String,
    /// The statement
    pub sql: String,
}

/// Result of `Command::Schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    /// Table name
    pub table: String,
    /// Every column in table order; all are `TEXT`
    pub columns: Vec<ColumnInfo>,
    /// Worked queries
    pub examples: Vec<ExampleInfo>,
}

impl SchemaInfo {
    /// Description of the `members` table.
    pub fn members() -> Self {
        SchemaInfo {
            table: TABLE_NAME.to_string(),
            columns: COLUMN_GUIDE
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.to_string(),
                    description: c.description.to_string(),
                })
                .collect(),
            examples: EXAMPLE_QUERIES
                .iter()
                .map(|e| ExampleInfo {
                    description: e.description.to_string(),
                    sql: e.sql.to_string(),
                })
                .collect(),
        }
    }

    /// Description of the column called `name`
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}
