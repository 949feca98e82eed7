//! Terminal rendering
//!
//! Progress, report and failure views. Everything here writes to stdout;
//! nothing here talks to the backend.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::*;
use insightflow_core::domain::job::{JobSnapshot, JobState, JobStatus};
use insightflow_core::domain::phase::ResearchPhase;
use insightflow_core::domain::research::{ResearchResult, Source};
use insightflow_core::dto::research::ResearchResponse;

/// Print the confirmation for a freshly created job
pub fn print_submitted(resp: &ResearchResponse) {
    println!("{}", "✓ Research started".green().bold());
    println!("  Job ID: {}", resp.job_id.cyan());
    println!("  Status: {}", resp.status.dimmed());
    println!();
}

/// How an agent is drawn relative to the active phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentMark {
    Active,
    Done,
    Pending,
}

fn agent_mark(agent: ResearchPhase, active: ResearchPhase) -> AgentMark {
    if agent == active {
        AgentMark::Active
    } else if agent.is_before(active) {
        AgentMark::Done
    } else {
        AgentMark::Pending
    }
}

/// Print the agent pipeline with the active phase highlighted
pub fn print_progress(snapshot: &JobSnapshot) {
    let active = snapshot.phase();
    let label = snapshot.step_label().unwrap_or("Processing...");

    let agents: Vec<String> = ResearchPhase::AGENTS
        .iter()
        .map(|phase| match agent_mark(*phase, active) {
            AgentMark::Active => format!("▸ {}", phase.agent_name()).cyan().bold().to_string(),
            AgentMark::Done => format!("✓ {}", phase.agent_name()).green().to_string(),
            AgentMark::Pending => format!("· {}", phase.agent_name()).dimmed().to_string(),
        })
        .collect();

    println!(
        "{} {}  {}",
        colorize_status(snapshot.status()),
        agents.join("  "),
        label.dimmed()
    );
}

/// Print a line from the backend's agent log stream
pub fn print_log_line(line: &str) {
    let now = chrono::Local::now().format("%H:%M:%S").to_string();
    let styled = if line.contains('❌') {
        line.red()
    } else if line.contains('✅') {
        line.green()
    } else if line.contains('🎓') {
        line.purple()
    } else if line.contains('🤖') {
        line.blue()
    } else {
        line.normal()
    };

    println!("  {} {}", format!("[{}]", now).dimmed(), styled);
}

/// Print a one-shot status view
pub fn print_status(job_id: &str, snapshot: &JobSnapshot) {
    println!("{}", "Job Status:".bold());
    println!("  ID:       {}", job_id.cyan());
    println!("  Status:   {}", colorize_status(snapshot.status()));
    if let Some(step) = snapshot.step_label() {
        println!("  Progress: {}", step);
    }
    println!();

    match &snapshot.state {
        JobState::Queued | JobState::Processing => print_progress(snapshot),
        JobState::Completed(result) => print_report(result),
        JobState::Error(message) => print_backend_failure(message),
    }
}

/// Print a completed research report
pub fn print_report(result: &ResearchResult) {
    println!("{}", "✓ Research Complete!".green().bold());
    println!("  Your research on: {}", format!("\"{}\"", result.query).bold());
    println!();

    println!("{}", "Research Report".bold());
    println!("{}", "─".repeat(80).dimmed());
    if result.is_empty() {
        println!("{}", "(empty report)".dimmed());
    } else {
        println!("{}", result.report.trim_end());
    }
    println!("{}", "─".repeat(80).dimmed());

    if !result.insights.is_empty() {
        println!("\n{}", "Key Insights:".bold());
        for insight in &result.insights {
            println!("  {} {}", "•".cyan(), insight);
        }
    }

    if !result.sources.is_empty() {
        println!("\n{}", format!("Sources ({}):", result.sources.len()).bold());
        for (i, source) in result.sources.iter().enumerate() {
            print_source(i + 1, source);
        }
    }
}

fn print_source(number: usize, source: &Source) {
    println!(
        "  {} {}",
        format!("{:>2}.", number).cyan(),
        source.title
    );
    println!(
        "      {} {}",
        hostname(&source.url).dimmed(),
        source.url.dimmed()
    );
}

/// Print a failure the backend reported for the job itself
pub fn print_backend_failure(message: &str) {
    println!("{}", "✗ Research Failed".red().bold());
    println!("  {}", message.red());
    println!(
        "  {}",
        "Run `insightflow research <QUERY>` to try again.".dimmed()
    );
}

/// Print the view shown when the backend could not be reached
pub fn print_unreachable(message: &str, api_url: &str) {
    println!("{}", "✗ Error".red().bold());
    println!("  {}", message.red());
    println!(
        "  {}",
        format!("Make sure the backend is running on {}", api_url).dimmed()
    );
}

/// Host part of a source URL, or the URL itself when it does not parse
pub fn hostname(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Write the markdown report to `output`
///
/// When `output` is an existing directory, a timestamped file name is
/// chosen inside it.
pub fn save_report(result: &ResearchResult, output: &Path) -> Result<PathBuf> {
    let path = if output.is_dir() {
        output.join(default_report_name())
    } else {
        output.to_path_buf()
    };

    fs::write(&path, &result.report)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path)
}

fn default_report_name() -> String {
    format!(
        "research-report-{}.md",
        chrono::Utc::now().timestamp_millis()
    )
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Queued => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Error => status_str.red(),
    }
}
