//! Research API endpoints

use insightflow_core::domain::research::ResearchResult;
use insightflow_core::dto::research::{ResearchRequest, ResearchResponse};
use insightflow_core::dto::status::StatusResponse;
use serde::Deserialize;
use tracing::debug;

use crate::InsightClient;
use crate::error::{ClientError, Result};

/// The backend answers lookups for unknown or unfinished jobs with a 2xx
/// `{"error": "..."}` body instead of an error status.
#[derive(Deserialize)]
#[serde(untagged)]
enum Body<T> {
    Ok(T),
    Err { error: String },
}

impl<T> Body<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Body::Ok(value) => Ok(value),
            Body::Err { error } => Err(ClientError::api_error(200, error)),
        }
    }
}

impl InsightClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a research query and create a job
    ///
    /// The request is validated locally first; a blank query never reaches
    /// the backend.
    ///
    /// # Returns
    /// The new job id and its initial status
    pub async fn start_research(&self, req: ResearchRequest) -> Result<ResearchResponse> {
        req.validate().map_err(ClientError::InvalidRequest)?;

        let url = self.url("/api/research");
        debug!("Submitting research query ({} mode)", req.search_mode);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Get the raw status of a job
    ///
    /// # Arguments
    /// * `job_id` - The opaque job id returned by [`start_research`](Self::start_research)
    pub async fn get_status(&self, job_id: &str) -> Result<StatusResponse> {
        let url = self.url(&format!("/api/status/{}", job_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response::<Body<StatusResponse>>(response)
            .await?
            .into_result()
    }

    /// Get the final result of a completed job
    pub async fn get_result(&self, job_id: &str) -> Result<ResearchResult> {
        let url = self.url(&format!("/api/result/{}", job_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response::<Body<ResearchResult>>(response)
            .await?
            .into_result()
    }

    // =============================================================================
    // Diagnostics
    // =============================================================================

    /// Liveness probe; the body shape is backend-defined
    pub async fn check_health(&self) -> Result<serde_json::Value> {
        let url = self.url("/api/health");
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insightflow_core::domain::job::JobStatus;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_start_research_posts_full_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/research")
            .match_body(Matcher::Json(json!({
                "query": "test",
                "search_mode": "academic",
                "min_citations": 10,
                "open_access": false,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"job_id": "abc123", "status": "processing"}"#)
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let resp = client
            .start_research(ResearchRequest::new("test").academic(10, false))
            .await
            .unwrap();

        assert_eq!(resp.job_id, "abc123");
        assert_eq!(resp.status, "processing");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_research_blank_query_not_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/research")
            .expect(0)
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let err = client
            .start_research(ResearchRequest::new("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidRequest(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_research_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/research")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let err = client
            .start_research(ResearchRequest::new("test"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_get_status_processing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status": "processing", "progress": "gathering", "result": null, "error": null}"#,
            )
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let status = client.get_status("abc123").await.unwrap();

        assert_eq!(status.status, JobStatus::Processing);
        assert_eq!(status.progress.as_deref(), Some("gathering"));
    }

    #[tokio::test]
    async fn test_get_status_http_500() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/abc123")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let err = client.get_status("abc123").await.unwrap_err();

        match err {
            ClientError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_status_error_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/missing")
            .with_status(200)
            .with_body(r#"{"error": "Job not found"}"#)
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let err = client.get_status("missing").await.unwrap_err();

        assert!(err.to_string().contains("Job not found"));
    }

    #[tokio::test]
    async fn test_get_status_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/abc123")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let err = client.get_status("abc123").await.unwrap_err();

        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_get_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/result/abc123")
            .with_status(200)
            .with_body(
                json!({
                    "query": "test",
                    "report": "# Findings",
                    "sources": [{"title": "A", "url": "https://a.example/x", "content": "..."}],
                    "insights": ["first"],
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let result = client.get_result("abc123").await.unwrap();

        assert_eq!(result.report, "# Findings");
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.insights, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_get_result_not_completed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/result/abc123")
            .with_status(200)
            .with_body(r#"{"error": "Job not completed yet"}"#)
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let err = client.get_result("abc123").await.unwrap_err();

        assert!(err.to_string().contains("Job not completed yet"));
    }

    #[tokio::test]
    async fn test_check_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(r#"{"status": "healthy", "openrouter_key_set": true}"#)
            .create_async()
            .await;

        let client = InsightClient::new(server.url());
        let health = client.check_health().await.unwrap();

        assert_eq!(health["status"], "healthy");
    }
}
