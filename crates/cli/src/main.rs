//! FinSight CLI — the main entry point.
//!
//! Commands:
//! - `ask`    — Answer one question against the indexed filings
//! - `doctor` — Diagnose configuration and service health
//! - `init`   — Write a starter finsight.toml

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "finsight",
    about = "FinSight — grounded question answering over SEC filings",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ./finsight.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question
    Ask {
        /// The question text
        question: String,

        /// Restrict to these tickers (repeatable)
        #[arg(short, long)]
        ticker: Vec<String>,

        /// Restrict to these fiscal years (repeatable)
        #[arg(short, long)]
        year: Vec<i32>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and service health
    Doctor,

    /// Write a default finsight.toml to the working directory
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            ticker,
            year,
            json,
        } => commands::ask::run(cli.config, question, ticker, year, json).await?,
        Commands::Doctor => commands::doctor::run(cli.config).await?,
        Commands::Init => commands::init::run()?,
    }

    Ok(())
}
