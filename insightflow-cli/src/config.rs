//! Configuration module
//!
//! Handles CLI configuration: where the backend lives and how to poll it.

use std::time::Duration;

use anyhow::{Result, bail};
use insightflow_client::{InsightClient, PollerConfig};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the research backend
    pub api_url: String,

    /// Time between status fetches while a job runs
    pub poll_interval: Duration,

    /// Consecutive failed status fetches tolerated before giving up
    pub max_retries: u32,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            bail!("api_url cannot be empty");
        }

        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("api_url is not a valid URL: {}", e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }

    /// Backend client for this configuration
    pub fn client(&self) -> InsightClient {
        InsightClient::new(&self.api_url)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: self.poll_interval,
            max_retries: self.max_retries,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            poll_interval: Duration::from_secs(2),
            max_retries: 0,
        }
    }
}
