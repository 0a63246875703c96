//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod locate;
mod scrape;
mod serve;
mod unlock;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use jobscrape::config::load_settings;

/// Ordering for `list` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    /// Upstream row order (most recent first)
    #[default]
    Upstream,
    /// Highest salary first
    Salary,
}

#[derive(Parser)]
#[command(name = "jobscrape")]
#[command(about = "Job board ingestion through a locked headless browser")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./jobscrape.toml when present)
    #[arg(short, long, global = true, env = "JOBSCRAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON web server
    Serve {
        /// Address to bind: port, host, or host:port (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scrape the board and print normalized listings
    List {
        /// Output ordering
        #[arg(short, long, value_enum, default_value_t = SortKey::Upstream)]
        sort: SortKey,
        /// Print the JSON listings instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Scrape one listing's detail page
    Detail {
        /// Upstream listing id (dashes optional)
        id: String,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show which location key free-form text resolves to
    Locate {
        /// Location text (multiple words are joined)
        #[arg(required = true)]
        text: Vec<String>,
        /// Override the configured match threshold
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Force-release the browser lock after a crashed session
    Unlock {
        /// Release without confirming the current holder
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())
        .await
        .map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::List { sort, json } => scrape::cmd_list(&settings, sort, json).await,
        Commands::Detail { id, json } => scrape::cmd_detail(&settings, &id, json).await,
        Commands::Locate { text, threshold } => {
            locate::cmd_locate(&settings, &text.join(" "), threshold)
        }
        Commands::Unlock { yes } => unlock::cmd_unlock(&settings, yes).await,
    }
}
