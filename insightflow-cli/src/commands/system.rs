//! Diagnostics and help commands

use anyhow::{Context, Result};
use colored::*;

use crate::config::Config;

/// Queries that show what the research agents are good at
pub const EXAMPLE_QUERIES: [&str; 4] = [
    "Analyze Indonesian e-wallet market: GoPay vs OVO vs Dana",
    "Top YC AI companies: business models and funding rounds",
    "Latest research on digital transformation in Indonesian SMEs",
    "Compare React vs Vue for enterprise applications",
];

/// Query the backend health probe and print whatever it returns
pub async fn check_health(config: &Config) -> Result<()> {
    let client = config.client();
    let health = client
        .check_health()
        .await
        .with_context(|| format!("Backend at {} is not healthy", config.api_url))?;

    println!("{} {}", "✓ Backend reachable at".green(), config.api_url.cyan());
    println!("{}", serde_json::to_string_pretty(&health)?);

    Ok(())
}

pub fn print_examples() {
    println!("{}", "Try these examples:".bold());
    for example in EXAMPLE_QUERIES {
        println!("  {} insightflow research \"{}\"", "▸".cyan(), example);
    }
}
