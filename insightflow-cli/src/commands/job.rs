//! Job command handlers
//!
//! Following a running job, one-shot status lookups and fetching finished
//! reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use insightflow_client::{PollPhase, PollSlot, PollView, StatusPoller, StatusSource};
use insightflow_core::domain::job::{JobSnapshot, JobStatus};
use tracing::debug;

use crate::config::Config;
use crate::render;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Follow a job until it finishes
    Watch {
        /// Job ID
        id: String,

        /// Write the markdown report to this file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the current status of a job
    Status {
        /// Job ID
        id: String,
    },
    /// Fetch the report of a completed job
    Result {
        /// Job ID
        id: String,

        /// Write the markdown report to this file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Watch { id, output } => watch_job(config, &id, output.as_deref()).await,
        JobCommands::Status { id } => show_status(config, &id).await,
        JobCommands::Result { id, output } => show_result(config, &id, output.as_deref()).await,
    }
}

/// Remembers what has already been printed for a job
#[derive(Debug, Default)]
struct ProgressFeed {
    last: Option<(JobStatus, Option<String>)>,
    logs_seen: usize,
}

impl ProgressFeed {
    /// Returns whether the progress line changed, and the log lines not
    /// printed yet
    fn observe<'a>(&mut self, snapshot: &'a JobSnapshot) -> (bool, &'a [String]) {
        let current = (
            snapshot.status(),
            snapshot.step_label().map(str::to_string),
        );
        let changed = self.last.as_ref() != Some(&current);
        self.last = Some(current);

        // The backend may restart its log buffer
        if snapshot.logs.len() < self.logs_seen {
            self.logs_seen = 0;
        }
        let fresh = &snapshot.logs[self.logs_seen..];
        self.logs_seen = snapshot.logs.len();

        (changed, fresh)
    }
}

enum Event {
    Update(Option<PollView>),
    Interrupted,
}

/// Poll a job and render its progress until it reaches a terminal state
///
/// The poller lives in a [`PollSlot`] for the duration of this call and is
/// unmounted on every exit path, Ctrl-C included.
pub async fn watch_job(config: &Config, job_id: &str, output: Option<&Path>) -> Result<()> {
    let poller = StatusPoller::new(config.client(), config.poller_config());
    let mut slot = PollSlot::new();
    slot.mount(&poller, job_id);

    println!("{}", format!("Watching job {}", job_id).bold());

    let outcome = follow(&mut slot).await;
    slot.unmount();

    let Some(view) = outcome else {
        println!();
        println!(
            "{}",
            format!(
                "Stopped watching. The job keeps running; resume with `insightflow job watch {}`",
                job_id
            )
            .yellow()
        );
        return Ok(());
    };

    println!();
    finish(config, &view, output)
}

/// Render updates until a terminal view, or `None` on Ctrl-C
async fn follow(slot: &mut PollSlot) -> Option<PollView> {
    let handle = slot.active_mut()?;
    let mut feed = ProgressFeed::default();

    loop {
        let event = tokio::select! {
            update = handle.changed() => Event::Update(update),
            _ = tokio::signal::ctrl_c() => Event::Interrupted,
        };

        let view = match event {
            Event::Update(Some(view)) => view,
            Event::Update(None) => return Some(handle.view()),
            Event::Interrupted => return None,
        };

        debug!("Poll update after {} fetch(es): {:?}", view.fetches, view.phase);

        if let Some(snapshot) = &view.snapshot {
            let (changed, fresh) = feed.observe(snapshot);
            if changed && !snapshot.is_terminal() {
                render::print_progress(snapshot);
            }
            for line in fresh {
                render::print_log_line(line);
            }
        }

        if view.phase.is_terminal() {
            return Some(view);
        }
    }
}

/// Render the terminal view and map failures to an error exit
fn finish(config: &Config, view: &PollView, output: Option<&Path>) -> Result<()> {
    let snapshot = view.snapshot.as_ref();

    match &view.phase {
        PollPhase::Completed => {
            let Some(result) = snapshot.and_then(JobSnapshot::result) else {
                bail!("Job completed without a result");
            };
            render::print_report(result);
            if let Some(output) = output {
                let path = render::save_report(result, output)?;
                println!("\n{} {}", "📥 Report saved to".green(), path.display());
            }
            Ok(())
        }
        PollPhase::Failed => {
            let message = snapshot.and_then(JobSnapshot::error).unwrap_or_default();
            render::print_backend_failure(message);
            bail!("Research failed: {}", message)
        }
        PollPhase::Unreachable(message) => {
            render::print_unreachable(message, &config.api_url);
            bail!("{}", message)
        }
        PollPhase::Idle | PollPhase::Polling => {
            bail!("Status poller stopped before the job finished")
        }
    }
}

/// Fetch and print the current status once
async fn show_status(config: &Config, job_id: &str) -> Result<()> {
    let client = config.client();
    let snapshot = match client.fetch_snapshot(job_id).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_not_found() => bail!("Job {} not found", job_id),
        Err(e) => return Err(e).context("Failed to fetch status"),
    };

    render::print_status(job_id, &snapshot);

    Ok(())
}

/// Fetch and print the finished report
async fn show_result(config: &Config, job_id: &str, output: Option<&Path>) -> Result<()> {
    let client = config.client();
    let result = client
        .get_result(job_id)
        .await
        .with_context(|| format!("Failed to fetch result for job {}", job_id))?;

    render::print_report(&result);

    if let Some(output) = output {
        let path = render::save_report(&result, output)?;
        println!("\n{} {}", "📥 Report saved to".green(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insightflow_core::domain::job::JobState;

    fn processing(progress: &str, logs: &[&str]) -> JobSnapshot {
        let mut snapshot = JobSnapshot::new(JobState::Processing).with_progress(progress);
        snapshot.logs = logs.iter().map(|l| l.to_string()).collect();
        snapshot
    }

    #[test]
    fn test_feed_reports_progress_changes_once() {
        let mut feed = ProgressFeed::default();

        let (changed, _) = feed.observe(&processing("planning", &[]));
        assert!(changed);

        let (changed, _) = feed.observe(&processing("planning", &[]));
        assert!(!changed);

        let (changed, _) = feed.observe(&processing("gathering", &[]));
        assert!(changed);
    }

    #[test]
    fn test_feed_yields_only_new_log_lines() {
        let mut feed = ProgressFeed::default();

        let first = processing("planning", &["🤖 planner up"]);
        let (_, fresh) = feed.observe(&first);
        assert_eq!(fresh, ["🤖 planner up".to_string()]);

        let second = processing("gathering", &["🤖 planner up", "✅ 12 sources"]);
        let (_, fresh) = feed.observe(&second);
        assert_eq!(fresh, ["✅ 12 sources".to_string()]);

        let reset = processing("gathering", &["restarted"]);
        let (_, fresh) = feed.observe(&reset);
        assert_eq!(fresh, ["restarted".to_string()]);
    }

    #[tokio::test]
    async fn test_watch_reports_unreachable_backend() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/abc123")
            .with_status(500)
            .create_async()
            .await;

        let config = Config {
            api_url: server.url(),
            ..Config::default()
        };

        let err = watch_job(&config, "abc123", None).await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch status"));
    }

    #[tokio::test]
    async fn test_status_unknown_job() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/nope")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let config = Config {
            api_url: server.url(),
            ..Config::default()
        };

        let err = show_status(&config, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Job nope not found");
    }

    #[tokio::test]
    async fn test_status_server_error_keeps_context() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/abc123")
            .with_status(500)
            .create_async()
            .await;

        let config = Config {
            api_url: server.url(),
            ..Config::default()
        };

        let err = show_status(&config, "abc123").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch status");
    }

    #[tokio::test]
    async fn test_watch_completed_saves_report() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/status/abc123")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "status": "completed",
                    "progress": "Complete!",
                    "result": {
                        "query": "test",
                        "report": "# Done",
                        "sources": [],
                        "insights": []
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = Config {
            api_url: server.url(),
            ..Config::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");

        watch_job(&config, "abc123", Some(&path)).await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Done");
    }
}
