//! Core types for RosterDB
//!
//! This crate defines the vocabulary shared by every layer:
//! - Record: one roster member with a fixed 31-attribute schema
//! - Dataset: an ordered, validated set of records (unique identifiers)
//! - Snapshot: a dataset plus the instant it was fetched
//! - Timestamp: microseconds since Unix epoch
//! - Value: a query result cell
//! - Error: validation failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dataset;
pub mod error;
pub mod record;
pub mod timestamp;
pub mod value;

pub use dataset::{Dataset, Snapshot};
pub use error::{Error, Result};
pub use record::{Record, FIELDS, FIELD_COUNT};
pub use timestamp::Timestamp;
pub use value::Value;
