//! Durability layer for RosterDB
//!
//! This crate handles everything that touches disk: a single-file,
//! crash-safe cache of the last successfully fetched [`Snapshot`]. It is
//! independent of the query store; the freshness layer decides when to load
//! and save.
//!
//! [`Snapshot`]: roster_core::Snapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod error;
mod format;

pub use cache::SnapshotCache;
pub use error::{CacheError, CacheResult};
pub use format::SNAPSHOT_FORMAT_VERSION;
