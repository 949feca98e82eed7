//! InsightFlow CLI
//!
//! Terminal front end for the InsightFlow research backend: submit a query,
//! follow its progress, read the report.

mod commands;
mod config;
mod render;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "insightflow")]
#[command(about = "InsightFlow research agent CLI", long_about = None)]
struct Cli {
    /// Research backend URL
    #[arg(
        long,
        global = true,
        env = "INSIGHTFLOW_API_URL",
        default_value = "http://localhost:8000"
    )]
    api_url: String,

    /// Milliseconds between status fetches while a job runs
    #[arg(
        long,
        global = true,
        env = "INSIGHTFLOW_POLL_INTERVAL_MS",
        default_value_t = 2000
    )]
    poll_interval_ms: u64,

    /// Failed status fetches in a row to tolerate before giving up
    #[arg(long, global = true, env = "INSIGHTFLOW_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "insightflow_cli=warn,insightflow_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        max_retries: cli.max_retries,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
