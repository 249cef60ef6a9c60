//! Channel-Harvest main entry point
//!
//! This is the command-line interface for the Channel-Harvest crawler.

use anyhow::Context;
use channel_harvest::config::{collect_seeds, load_config_with_hash, validate, Config};
use channel_harvest::crawler::{connect_platform, run_crawl};
use channel_harvest::output::{load_statistics, print_statistics};
use channel_harvest::platform::{ExportClient, PlatformClient};
use channel_harvest::storage::{lock_store, open_store};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Channel-Harvest: a resumable, layered channel crawler
///
/// Channel-Harvest crawls channels breadth-first by discovery depth, stores a
/// normalized record for every message, offloads media to blob storage and
/// checkpoints after every channel so an interrupted crawl resumes where it
/// stopped.
#[derive(Parser, Debug)]
#[command(name = "channel-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, layered channel crawler", long_about = None)]
struct Cli {
    /// Comma-separated seed channel identifiers
    #[arg(long, value_delimiter = ',')]
    urls: Vec<String>,

    /// File with one seed channel identifier per line
    #[arg(long, value_name = "FILE")]
    url_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Connect the platform client, then exit without crawling
    #[arg(long, conflicts_with_all = ["stats", "fresh"])]
    bootstrap: bool,

    /// Start a fresh crawl instead of resuming an unfinished one
    #[arg(long)]
    fresh: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "fresh")]
    stats: bool,

    /// Crawl to show statistics for (defaults to the latest)
    #[arg(long, requires = "stats")]
    crawl_id: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match load_config_with_hash(cli.config.as_deref()) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    validate(&config)?;

    if cli.stats {
        handle_stats(&config, cli.crawl_id.as_deref())?;
        return Ok(());
    }

    let client: Arc<dyn PlatformClient> = Arc::new(ExportClient::new(
        config.platform.name.clone(),
        config.platform.export_root.clone(),
        config.platform.download_dir.clone(),
    ));

    if cli.bootstrap {
        handle_bootstrap(&config, client.as_ref()).await?;
    } else {
        handle_crawl(&cli, &config, &config_hash, client).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("channel_harvest=info,warn"),
            1 => EnvFilter::new("channel_harvest=debug,info"),
            2 => EnvFilter::new("channel_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --bootstrap mode: connects the platform client once
async fn handle_bootstrap(
    config: &Config,
    client: &dyn PlatformClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.crawler.bootstrap_timeout_secs);
    connect_platform(client, timeout).await?;

    if let Err(e) = client.disconnect().await {
        tracing::warn!(error = %e, "Platform disconnect failed");
    }

    println!("✓ {} client bootstrapped", client.platform_name());
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config, crawl_id: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.storage.database_path);

    let store = open_store(Path::new(&config.storage.database_path))
        .with_context(|| format!("opening {}", config.storage.database_path))?;
    let store = lock_store(&store)?;

    let crawl_id = match crawl_id {
        Some(id) => id.to_string(),
        None => match store.latest_crawl()? {
            Some(crawl) => crawl.crawl_id,
            None => {
                println!("No crawls recorded yet");
                return Ok(());
            }
        },
    };

    let stats = load_statistics(&*store, &crawl_id)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    cli: &Cli,
    config: &Config,
    config_hash: &str,
    client: Arc<dyn PlatformClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    let seeds = collect_seeds(&cli.urls, cli.url_file.as_deref())?;

    if cli.fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume if an unfinished crawl exists)");
    }
    tracing::info!("Seed channels: {}", seeds.len());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current channel");
            on_signal.cancel();
        }
    });

    match run_crawl(config, config_hash, &seeds, cli.fresh, client, cancel).await {
        Ok(report) => {
            tracing::info!(
                crawl_id = %report.crawl_id,
                visited = report.pages_visited,
                fetched = report.fetched,
                errored = report.errored,
                discovered = report.discovered,
                layers = report.layers,
                cancelled = report.cancelled,
                "Crawl run finished"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
