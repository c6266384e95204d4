//! Freshness and query integration tests.
//!
//! Every test drives a real coordinator (SQLite store, on-disk cache) with a
//! scripted fetcher and a manual clock.

#[path = "../common/mod.rs"]
mod common;

mod atomic_swap;
mod persistence;
mod scenarios;
mod single_flight;
mod ttl_gating;
mod write_rejection;
