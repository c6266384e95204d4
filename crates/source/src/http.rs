//! HTTP fetcher for the upstream roster endpoint

use std::time::{Duration, Instant};

use roster_core::Dataset;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::payload::decode_payload;
use crate::SnapshotFetcher;

/// Public roster endpoint of the SNH48 group family (all groups, JSONP).
pub const DEFAULT_SOURCE_URL: &str =
    "https://h5.48.cn/resource/jsonp/allmembers.php?gid=00&callback=get_members_success";

/// Default request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The endpoint rejects requests without a browser user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fetches the full roster with one blocking GET.
pub struct HttpFetcher {
    url: String,
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher for `url` with a global request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let agent = ureq::Agent::new_with_config(config);
        HttpFetcher {
            url: url.into(),
            agent,
        }
    }

    /// The configured source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn get_body(&self) -> Result<String, FetchError> {
        let mut response = self
            .agent
            .get(&self.url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => FetchError::Status(code),
                other => FetchError::Network(other.to_string()),
            })?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Network(format!("failed to read response: {}", e)))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher::new(DEFAULT_SOURCE_URL, DEFAULT_FETCH_TIMEOUT)
    }
}

impl SnapshotFetcher for HttpFetcher {
    fn fetch(&self) -> Result<Dataset, FetchError> {
        let started = Instant::now();
        info!(target: "roster::source", url = %self.url, "Fetching roster from upstream");

        let body = self.get_body().map_err(|e| {
            warn!(target: "roster::source", url = %self.url, error = %e, "Roster fetch failed");
            e
        })?;
        debug!(target: "roster::source", bytes = body.len(), "Received roster payload");

        let dataset = decode_payload(&body).map_err(|e| {
            warn!(target: "roster::source", error = %e, "Rejected upstream payload");
            e
        })?;

        info!(
            target: "roster::source",
            records = dataset.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Roster fetched"
        );
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
