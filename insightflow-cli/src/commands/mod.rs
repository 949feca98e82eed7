//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod research;
mod system;

pub use job::JobCommands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use insightflow_core::dto::research::SearchMode;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start a research job and follow it until the report is ready
    Research {
        /// What to research
        query: String,

        /// Source pool: web or academic
        #[arg(long, default_value = "web")]
        mode: SearchMode,

        /// Minimum citation count for academic sources
        #[arg(long, default_value_t = 0)]
        min_citations: u32,

        /// Only use open access papers
        #[arg(long)]
        open_access: bool,

        /// Print the job id and return without waiting
        #[arg(short, long)]
        detach: bool,

        /// Write the markdown report to this file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Job inspection
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Check that the backend is up
    Health,
    /// Show example research queries
    Examples,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Research {
            query,
            mode,
            min_citations,
            open_access,
            detach,
            output,
        } => {
            let options = research::ResearchOptions {
                mode,
                min_citations,
                open_access,
                detach,
                output,
            };
            research::handle_research(query, options, config).await
        }
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Health => system::check_health(config).await,
        Commands::Examples => {
            system::print_examples();
            Ok(())
        }
    }
}
