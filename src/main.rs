//! # IL Labor Meetings
//!
//! Scrapes public meeting records of the Illinois Labor Relations Board and
//! writes them as normalized JSON Lines.
//!
//! ## Usage
//!
//! ```sh
//! il_labor_meetings -o ./il_labor.jsonl
//! ```
//!
//! ## Architecture
//!
//! 1. **Upcoming**: parse the next meeting of each board from the meetings page
//! 2. **Archives**: follow the state, local and joint minutes pages
//! 3. **Normalize**: stamp each record with a stable id and a status
//! 4. **Output**: deduplicate by id and write JSON Lines

use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[macro_use]
mod macros;

mod cli;
mod config;
mod crawl;
mod dates;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::{CrawlConfig, load_config};
use crawl::{HttpFetcher, RetryFetch, crawl};
use outputs::json::{JsonLinesSink, write_meetings};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("il_labor_meetings starting up");

    let args = Cli::parse();
    debug!(?args.output, ?args.config, "Parsed CLI arguments");

    // ---- Config ----
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path).await?,
        None => CrawlConfig::default(),
    };
    if let Some(start_url) = args.start_url {
        config.start_url = start_url;
    }
    let config = config;
    info!(
        agency = %config.agency,
        start_url = %config.start_url,
        timezone = %config.timezone,
        "Crawl configured"
    );

    // ---- Crawl ----
    let fetcher = RetryFetch::new(
        HttpFetcher::new(&config)?,
        config.max_retries,
        config.retry_base_delay(),
    )
    .with_max_jitter(config.retry_max_jitter());
    let now = Local::now().naive_local();
    let mut sink = JsonLinesSink::default();
    let report = crawl(&fetcher, &config, now, &mut sink).await?;

    let by_status = sink
        .meetings()
        .iter()
        .counts_by(|m| m.status)
        .into_iter()
        .map(|(status, n)| format!("{status:?}={n}"))
        .sorted()
        .join(" ");
    info!(unique = sink.meetings().len(), %by_status, "Meetings collected");

    // ---- Output ----
    write_meetings(&sink, args.output.as_deref()).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        pages_ok = report.pages_ok,
        pages_failed = report.pages_failed,
        "Execution complete"
    );

    if report.pages_failed > 0 {
        return Err(format!(
            "{} page(s) failed to fetch or parse; see the error log",
            report.pages_failed
        )
        .into());
    }
    Ok(())
}
