//! # Conflict News
//!
//! A news aggregation service that scrapes conflict coverage from several
//! Indian outlets, keeps only topically relevant articles, merges articles
//! that report the same event, and serves the most recent stories over HTTP.
//!
//! ## Features
//!
//! - Scrapes NDTV, Times of India and Indian Express
//! - Fuzzy keyword relevance filter over headlines and body openings
//! - Content fingerprinting to merge the same report across sources
//! - Recency ranking with a fixed display offset (IST by default)
//! - Background refresh with atomic snapshot publication
//! - HTML front page, JSON API and an optional `latest.json` export
//!
//! ## Usage
//!
//! ```sh
//! conflict_news -c ./config.yaml -b 0.0.0.0:5000
//! conflict_news --once
//! ```
//!
//! ## Architecture
//!
//! Every refresh runs the same pipeline from scratch:
//! 1. **Fetching**: Each configured source returns its raw articles
//! 2. **Filtering**: Articles without a topical keyword match are dropped
//! 3. **Grouping**: Articles sharing a body fingerprint become one story
//! 4. **Ranking**: Stories are ordered by latest time and trimmed
//! 5. **Publishing**: The result replaces the snapshot readers see

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod grouping;
mod http;
mod models;
mod outputs;
mod pipeline;
mod ranking;
mod relevance;
mod scrapers;
mod snapshot;
mod time;
mod utils;
mod web;

use cli::Cli;
use config::Config;
use outputs::json;
use pipeline::Pipeline;
use snapshot::{Refresher, SnapshotStore};
use time::TimeNormalizer;
use utils::ensure_writable_dir;
use web::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr; stdout carries --once output) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    info!("conflict_news starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.apply_cli(&args)?;
    info!(
        sources = config.sources.len(),
        max_stories = config.max_stories,
        utc_offset = %config.utc_offset,
        "Configuration ready"
    );

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Build pipeline ----
    let client = Arc::new(http::page_client(&config.http)?);
    let fetchers = scrapers::build_fetchers(&config, client);
    let pipeline = Arc::new(Pipeline::new(&config, fetchers));
    info!(sources = ?pipeline.sources(), "Pipeline initialized");

    if args.once {
        let snapshot = pipeline.snapshot().await;
        if let Some(dir) = &args.json_output_dir {
            if let Err(e) = json::write_snapshot(&snapshot, dir).await {
                error!(path = %dir, error = %e, "Failed to write JSON snapshot");
            }
        }
        println!("{}", json::to_json(&snapshot)?);
        info!(stories = snapshot.stories.len(), "Single run complete");
        return Ok(());
    }

    // ---- Background refresh + HTTP ----
    let store = Arc::new(SnapshotStore::new(TimeNormalizer::new(config.offset())));
    let mut refresher = Refresher::new(
        pipeline,
        Arc::clone(&store),
        Duration::from_secs(config.refresh_interval_secs),
    );
    if let Some(dir) = &args.json_output_dir {
        refresher = refresher.with_json_output(dir);
    }
    let _refresh_task = refresher.spawn();

    web::serve(&args.bind, AppState { store }).await?;

    Ok(())
}
