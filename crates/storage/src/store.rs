//! Immutable SQL query store
//!
//! A [`QueryStore`] is built once from a [`Dataset`] and never modified.
//! The rows live in a uniquely named shared-cache in-memory SQLite database.
//! One read-write connection (the anchor) populates the `members` table and
//! then only keeps the database alive. Every query opens its own
//! `query_only` connection, so any number of threads can query one store at
//! the same time and none of them can change it.
//!
//! Swapping in newer data means building a new store; readers holding the
//! old one keep seeing the old rows until they drop it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use roster_core::{Dataset, Value};
use roster_security::{classify, AccessMode, StatementClass};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, ErrorCode, OpenFlags};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::result::{QueryLimits, QueryResult};
use crate::schema;

/// VM instructions between deadline checks.
const PROGRESS_STEPS: i32 = 1_000;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Read-only SQL view over one dataset.
pub struct QueryStore {
    generation: u64,
    uri: String,
    record_count: usize,
    limits: QueryLimits,
    // Keeps the shared in-memory database alive; not used after build.
    _anchor: Mutex<Connection>,
}

impl std::fmt::Debug for QueryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryStore")
            .field("generation", &self.generation)
            .field("record_count", &self.record_count)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl QueryStore {
    /// Build a store over `dataset` with default limits.
    pub fn build(dataset: &Dataset) -> StoreResult<Self> {
        Self::build_with_limits(dataset, QueryLimits::default())
    }

    /// Build a store over `dataset`.
    ///
    /// All records are inserted in one transaction; the store is returned
    /// only once they are committed.
    pub fn build_with_limits(dataset: &Dataset, limits: QueryLimits) -> StoreResult<Self> {
        let started = Instant::now();
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let uri = format!(
            "file:roster-store-{}?mode=memory&cache=shared",
            generation
        );

        let mut anchor = open_connection(&uri, AccessMode::ReadWrite).map_err(build_error)?;
        anchor
            .execute_batch(&schema::create_table_sql())
            .map_err(build_error)?;

        let tx = anchor.transaction().map_err(build_error)?;
        {
            let mut insert = tx.prepare(&schema::insert_sql()).map_err(build_error)?;
            for record in dataset.records() {
                insert
                    .execute(params_from_iter(record.values()))
                    .map_err(build_error)?;
            }
        }
        tx.commit().map_err(build_error)?;

        info!(
            target: "roster::store",
            generation,
            records = dataset.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built query store"
        );

        Ok(QueryStore {
            generation,
            uri,
            record_count: dataset.len(),
            limits,
            _anchor: Mutex::new(anchor),
        })
    }

    /// Process-unique id of this store; later builds get larger ids.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of member rows
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// True if the store holds no members
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Limits applied to every query
    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Run a read-only statement.
    ///
    /// Statements that are not read-only are rejected before they reach the
    /// engine.
    pub fn query(&self, sql: &str) -> StoreResult<QueryResult> {
        if let StatementClass::Rejected(reason) = classify(sql) {
            debug!(target: "roster::store", %reason, "Rejected statement");
            return Err(StoreError::Rejected(reason.to_string()));
        }

        let started = Instant::now();
        let conn = self.open_reader()?;
        let deadline = started + self.limits.timeout;
        conn.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));

        let mut stmt = conn.prepare(sql).map_err(|e| self.query_error(e))?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([]).map_err(|e| self.query_error(e))?;
        let mut out: Vec<Vec<Value>> = Vec::new();
        while let Some(row) = rows.next().map_err(|e| self.query_error(e))? {
            if out.len() == self.limits.max_rows {
                return Err(StoreError::LimitExceeded {
                    limit: self.limits.max_rows,
                });
            }
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let cell = row.get_ref(index).map_err(|e| self.query_error(e))?;
                values.push(to_value(cell));
            }
            out.push(values);
        }

        debug!(
            target: "roster::store",
            generation = self.generation,
            rows = out.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Query complete"
        );
        Ok(QueryResult { columns, rows: out })
    }

    fn open_reader(&self) -> StoreResult<Connection> {
        open_connection(&self.uri, AccessMode::ReadOnly)
            .map_err(|e| StoreError::Query(format!("failed to open reader: {}", e)))
    }

    fn query_error(&self, err: rusqlite::Error) -> StoreError {
        match err.sqlite_error_code() {
            Some(ErrorCode::OperationInterrupted) => StoreError::Timeout(self.limits.timeout),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

fn open_connection(uri: &str, mode: AccessMode) -> rusqlite::Result<Connection> {
    let mut flags =
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if mode.allows_writes() {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    let conn = Connection::open_with_flags(uri, flags)?;
    if !mode.allows_writes() {
        conn.pragma_update(None, "query_only", true)?;
    }
    Ok(conn)
}

fn build_error(err: rusqlite::Error) -> StoreError {
    StoreError::Build(err.to_string())
}

fn to_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}
