//! chronik CLI entry point

use chronik::{
    commands::{cmd_crawl, cmd_status, print_campaign_summary, print_status},
    config::Config,
    progress::LogWriterFactory,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "chronik")]
#[command(version, about = "Harvests the Hessen chronicles of right-wing violence into SQLite", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a crawl campaign against the enabled sites
    Crawl {
        /// Crawl only these sites (default: all enabled in config)
        #[arg(long)]
        site: Option<Vec<String>>,
    },

    /// Show stored record counts per chronicler
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(LogWriterFactory::default())
                .with_target(false),
        )
        .with(filter)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl { site } => {
            if let Some(sites) = site {
                config.sites = sites;
            }
            let summaries = cmd_crawl(&config).await?;
            print_campaign_summary(&summaries);
        }
        Commands::Status => {
            let counts = cmd_status(&config).await?;
            print_status(&counts);
        }
    }

    Ok(())
}
