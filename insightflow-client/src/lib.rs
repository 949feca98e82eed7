//! InsightFlow HTTP Client
//!
//! A small, type-safe client for the InsightFlow research backend, plus the
//! job status poller that drives the progress views.
//!
//! # Example
//!
//! ```no_run
//! use insightflow_client::{InsightClient, PollerConfig, StatusPoller};
//! use insightflow_core::dto::research::ResearchRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InsightClient::new("http://localhost:8000");
//!
//!     let job = client.start_research(ResearchRequest::new("test")).await?;
//!
//!     let poller = StatusPoller::new(client, PollerConfig::default());
//!     let view = poller.start(job.job_id).wait().await;
//!     println!("finished in phase {:?}", view.phase);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod poller;
mod research;
mod source;

pub use error::{ClientError, Result};
pub use poller::{PollHandle, PollPhase, PollSlot, PollView, PollerConfig, StatusPoller};
pub use source::StatusSource;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the research backend API
///
/// Covers research submission, status and result lookup, and the health
/// probe. The base URL is always injected; nothing here reads the
/// environment.
#[derive(Debug, Clone)]
pub struct InsightClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl InsightClient {
    /// Create a new backend client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use insightflow_client::InsightClient;
    ///
    /// let client = InsightClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new backend client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use insightflow_client::InsightClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = InsightClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx responses become [`ClientError::ApiError`] carrying the body
    /// text; bodies that are not the expected JSON become
    /// [`ClientError::ParseError`].
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
