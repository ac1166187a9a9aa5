//! autoblock - Blocklist reconciler
//!
//! Merges IP lists from files and URLs into a persisted deny store.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use autoblock::cli::Cli;
use autoblock::config::RunSettings;
use autoblock::utils::format_elapsed;

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    // Dry runs always log at debug level
    let log_level = if cli.verbose || cli.dry_run {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = RunSettings::from_cli(&cli)?;
    let report = autoblock::update::run(&settings).await?;

    if !cli.quiet {
        println!("{}", report);
    }
    info!("Elapsed time: {}", format_elapsed(start.elapsed()));

    Ok(())
}
