//! Research submission
//!
//! The CLI counterpart of the query form: validate, submit, then hand the
//! job over to the watcher.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use colored::*;
use insightflow_core::dto::research::{ResearchRequest, SearchMode};
use tracing::info;

use crate::commands::job::watch_job;
use crate::config::Config;
use crate::render;

/// Flags of the `research` command besides the query
pub struct ResearchOptions {
    pub mode: SearchMode,
    pub min_citations: u32,
    pub open_access: bool,
    pub detach: bool,
    pub output: Option<PathBuf>,
}

/// Build the request body from the command line
fn build_request(query: String, options: &ResearchOptions) -> Result<ResearchRequest> {
    let request = ResearchRequest {
        query,
        search_mode: options.mode,
        min_citations: options.min_citations,
        open_access: options.open_access,
    };
    request.validate().map_err(|e| anyhow!(e))?;

    Ok(request)
}

/// Submit a query and, unless detached, follow the job
pub async fn handle_research(query: String, options: ResearchOptions, config: &Config) -> Result<()> {
    let request = build_request(query, &options)?;

    if request.search_mode == SearchMode::Web && (request.min_citations > 0 || request.open_access) {
        println!(
            "{}",
            "⚠ Citation and license filters only apply in academic mode".yellow()
        );
    }

    let client = config.client();
    let response = client
        .start_research(request)
        .await
        .context("Failed to start research. Is the backend running?")?;

    info!("Created research job {}", response.job_id);
    render::print_submitted(&response);

    if options.detach {
        println!(
            "{}",
            format!("Follow it with `insightflow job watch {}`", response.job_id).dimmed()
        );
        return Ok(());
    }

    watch_job(config, &response.job_id, options.output.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn config_for(server: &mockito::Server) -> Config {
        Config {
            api_url: server.url(),
            poll_interval: Duration::from_millis(20),
            ..Config::default()
        }
    }

    fn options(mode: SearchMode) -> ResearchOptions {
        ResearchOptions {
            mode,
            min_citations: 100,
            open_access: true,
            detach: true,
            output: None,
        }
    }

    #[test]
    fn test_build_request_keeps_filters() {
        let req = build_request("GoPay vs OVO".to_string(), &options(SearchMode::Academic)).unwrap();

        assert_eq!(req.query, "GoPay vs OVO");
        assert_eq!(req.search_mode, SearchMode::Academic);
        assert_eq!(req.min_citations, 100);
        assert!(req.open_access);
    }

    #[test]
    fn test_build_request_rejects_blank_query() {
        let err = build_request("\n\t".to_string(), &options(SearchMode::Web)).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a query");
    }

    #[tokio::test]
    async fn test_research_follows_job_until_report() {
        let mut server = mockito::Server::new_async().await;
        let submit = server
            .mock("POST", "/api/research")
            .with_status(200)
            .with_body(r#"{"job_id": "abc123", "status": "processing"}"#)
            .create_async()
            .await;

        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fetches);
        let status = server
            .mock("GET", "/api/status/abc123")
            .with_status(200)
            .with_body_from_request(move |_| {
                let body = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    serde_json::json!({"status": "processing", "progress": "gathering"})
                } else {
                    serde_json::json!({
                        "status": "completed",
                        "result": {
                            "query": "test",
                            "report": "# Findings",
                            "sources": [],
                            "insights": []
                        }
                    })
                };
                body.to_string().into_bytes()
            })
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let options = ResearchOptions {
            mode: SearchMode::Web,
            min_citations: 0,
            open_access: false,
            detach: false,
            output: Some(path.clone()),
        };

        handle_research("test".to_string(), options, &config_for(&server))
            .await
            .unwrap();

        // Polling has stopped; give a stray tick the chance to show up
        tokio::time::sleep(Duration::from_millis(100)).await;

        submit.assert_async().await;
        status.assert_async().await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Findings");
    }

    #[tokio::test]
    async fn test_research_submit_failure_never_polls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/research")
            .with_status(500)
            .create_async()
            .await;
        let status = server
            .mock("GET", mockito::Matcher::Regex(r"^/api/status/".to_string()))
            .expect(0)
            .create_async()
            .await;

        let mut opts = options(SearchMode::Web);
        opts.detach = false;

        let err = handle_research("test".to_string(), opts, &config_for(&server))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to start research. Is the backend running?"
        );
        status.assert_async().await;
    }
}
