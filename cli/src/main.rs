//! Sightline CLI
//!
//! Command-line interface for interacting with the Sightline observability
//! dashboard backend.
//!
//! # Usage
//!
//! ```bash
//! sightline --help
//! sightline health
//! sightline overview
//! ```

#![deny(unsafe_code)]

use clap::{Parser, Subcommand};

/// Sightline CLI - observability dashboard command-line interface
#[derive(Parser)]
#[command(name = "sightline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "SIGHTLINE_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Show the observability overview snapshot
    Overview,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health) => {
            println!("Checking health of Sightline API at {}...", cli.api_url);
            println!("Health check not yet implemented");
        }
        Some(Commands::Overview) => {
            println!("Fetching overview from Sightline API at {}...", cli.api_url);
            println!("Overview command not yet implemented");
        }
        None => {
            println!("Sightline CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
