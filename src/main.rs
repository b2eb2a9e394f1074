//! # Deep Tech Briefing
//!
//! A batch job that gathers news-feed items for a few topical categories,
//! asks a Gemini model to pick and summarize the most important ones in the
//! configured language, and publishes the result as one JSON snapshot for a
//! read-only viewer.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... deep_tech_briefing -c briefing.yaml
//! ```
//!
//! ## Architecture
//!
//! One run is a straight line, category by category, with no concurrency:
//! 1. **Fetch**: read the category's RSS/Atom feed into candidates
//! 2. **Prompt**: build the category-specific instructions
//! 3. **Summarize**: a single low-temperature, JSON-mode model call
//! 4. **Parse**: strip code fences, decode, stamp category and time
//! 5. **Publish**: write the store once, replacing the previous snapshot
//!
//! Scheduling is external (cron, a CI schedule, ...).

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod feeds;
mod models;
mod outputs;
mod parser;
mod pipeline;
mod prompts;
mod utils;

use api::GeminiClient;
use cli::Cli;
use config::Config;
use feeds::rss::HttpFeedSource;
use outputs::markdown;
use pipeline::Pipeline;

const FEED_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("briefing run starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output, ?args.markdown_output, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.store_path = output;
    }
    info!(
        categories = config.categories.len(),
        top_k = config.top_k,
        store = %config.store_path.display(),
        model = %config.model.name,
        "Configuration ready"
    );

    let http = Client::builder()
        .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let feeds = HttpFeedSource::new(http.clone());
    let summarizer = args
        .api_key
        .filter(|key| !key.trim().is_empty())
        .map(|key| GeminiClient::new(http, key, config.model.clone()));

    let report = Pipeline::new(&config, &feeds, summarizer.as_ref()).run().await?;
    info!(
        with_results = report.categories_with_results,
        skipped = report.categories_skipped,
        records = report.records,
        written = report.store_written,
        "Pipeline finished"
    );

    // ---- Markdown digest ----
    if let Some(path) = args.markdown_output {
        if let Err(e) = markdown::write_digest(
            &config.store_path,
            &config.categories,
            config.digest.items(),
            &path,
        )
        .await
        {
            error!(path = %path.display(), error = %e, "Failed writing Markdown digest");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
