//! Query store for RosterDB
//!
//! This crate turns a [`Dataset`] into an immutable, read-only SQL store:
//! - `QueryStore`: one `members` table in a private in-memory SQLite database
//! - Every statement is classified before it reaches the engine
//! - Per-query row and time limits
//!
//! Stores are built, shared behind an `Arc`, and replaced whole. Nothing in
//! this crate mutates a store once it has been returned.
//!
//! [`Dataset`]: roster_core::Dataset

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod result;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use result::{QueryLimits, QueryResult, DEFAULT_MAX_ROWS, DEFAULT_QUERY_TIMEOUT};
pub use schema::{
    ColumnGuide, ExampleQuery, COLUMN_GUIDE, EXAMPLE_QUERIES, IDENTIFIER_ALIAS, TABLE_NAME,
};
pub use store::QueryStore;
