//! Freshness engine for RosterDB
//!
//! This crate orchestrates all lower layers:
//! - FreshnessCoordinator: load on first use, TTL-gated refresh,
//!   single-flight fetches, atomic store swaps
//! - Configuration (`roster.toml` plus environment overrides)
//! - Clock abstraction for deterministic tests
//!
//! The engine is the only component that knows about:
//! - When to contact upstream
//! - When to read and write the snapshot cache
//! - Which query store readers see

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RosterConfig, CONFIG_FILE_NAME, LEGACY_TTL_ENV_VAR, TTL_ENV_VAR};
pub use coordinator::FreshnessCoordinator;
pub use error::{EngineError, EngineResult, RefreshError};
pub use state::{
    CoordinatorMetrics, CoordinatorStatus, Origin, Phase, QueryOutcome, RefreshReport,
};
