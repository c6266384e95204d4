//! Configuration via `roster.toml`
//!
//! A missing file means defaults. To change settings, edit the file and
//! restart. `ROSTER_CACHE_TTL` (seconds) overrides `ttl_secs` without
//! touching the file. The older name `SNH48_CACHE_TTL` is still read when
//! `ROSTER_CACHE_TTL` is unset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use roster_source::DEFAULT_SOURCE_URL;
use roster_storage::QueryLimits;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "roster.toml";

/// Environment variable overriding `ttl_secs`.
pub const TTL_ENV_VAR: &str = "ROSTER_CACHE_TTL";

/// Older name for [`TTL_ENV_VAR`], consulted only when that one is unset.
pub const LEGACY_TTL_ENV_VAR: &str = "SNH48_CACHE_TTL";

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("data/roster_members.json")
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

fn default_max_rows() -> usize {
    roster_storage::DEFAULT_MAX_ROWS
}

/// Settings loaded from `roster.toml`.
///
/// # Example
///
/// ```toml
/// ttl_secs = 600
/// cache_file = "/var/lib/roster/members.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    /// Upstream roster endpoint
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// Where the last good snapshot is persisted
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    /// Maximum snapshot age before a query triggers a refresh
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Upstream request timeout
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Per-query wall-clock budget
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    /// Per-query row cap
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            cache_file: default_cache_file(),
            ttl_secs: default_ttl_secs(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            max_rows: default_max_rows(),
        }
    }
}

impl RosterConfig {
    /// Snapshot TTL
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Upstream request timeout
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Limits applied to every query
    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            max_rows: self.max_rows,
            timeout: Duration::from_millis(self.query_timeout_ms),
        }
    }

    /// Reject values that would make the service unusable.
    ///
    /// A TTL of zero is allowed and means every query refreshes.
    pub fn validate(&self) -> EngineResult<()> {
        if self.source_url.trim().is_empty() {
            return Err(EngineError::Config("source_url must not be empty".into()));
        }
        if self.cache_file.as_os_str().is_empty() {
            return Err(EngineError::Config("cache_file must not be empty".into()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(EngineError::Config("fetch_timeout_ms must be positive".into()));
        }
        if self.query_timeout_ms == 0 {
            return Err(EngineError::Config("query_timeout_ms must be positive".into()));
        }
        if self.max_rows == 0 {
            return Err(EngineError::Config("max_rows must be positive".into()));
        }
        Ok(())
    }

    /// Apply `ROSTER_CACHE_TTL` (or `SNH48_CACHE_TTL`) from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) -> EngineResult<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply environment-style overrides read through `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> EngineResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl = [TTL_ENV_VAR, LEGACY_TTL_ENV_VAR]
            .into_iter()
            .find_map(|name| lookup(name).map(|raw| (name, raw)));
        if let Some((name, raw)) = ttl {
            self.ttl_secs = raw.trim().parse().map_err(|_| {
                EngineError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    name, raw
                ))
            })?;
        }
        Ok(())
    }

    /// Load the effective configuration.
    ///
    /// Reads `path` when it exists (defaults otherwise), then applies
    /// environment overrides and validates the result.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Roster configuration
#
# Upstream roster endpoint (JSONP or JSON).
source_url = "https://h5.48.cn/resource/jsonp/allmembers.php?gid=00&callback=get_members_success"

# Last successfully fetched snapshot. Read at startup, replaced after
# every successful refresh.
cache_file = "data/roster_members.json"

# Seconds before a query triggers a refresh (default: 3600).
# ROSTER_CACHE_TTL (or the older SNH48_CACHE_TTL) overrides this value.
ttl_secs = 3600

# Upstream request timeout in milliseconds (default: 30000).
fetch_timeout_ms = 30000

# Per-query limits. Queries over max_rows fail; add a LIMIT clause.
query_timeout_ms = 5000
max_rows = 10000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            EngineError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> EngineResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                EngineError::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> EngineResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            EngineError::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
