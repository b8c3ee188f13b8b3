//! Scrapes one publication date and prints the run summary.
//!
//! Usage:
//! ```
//! cargo run --example scrape_date -- 2024-06-30
//! ```
//!
//! The date falls back to `SEACE_DATE`, then to yesterday. Set
//! `SEACE_REPORT` to write the report to a file instead of stdout and
//! `SEACE_HEADFUL=1` to watch the browser.

use chrono::{Duration, Local, NaiveDate};
use seace_scraper::{ScrapeRequest, SeaceService};
use tower::Service;
use tracing_subscriber::EnvFilter;

fn search_date() -> Result<NaiveDate, chrono::ParseError> {
    match std::env::args().nth(1).or_else(|| std::env::var("SEACE_DATE").ok()) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"),
        None => Ok(Local::now().date_naive() - Duration::days(1)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logs go to stderr so the report can be redirected from stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let date = search_date()?;
    let mut request = ScrapeRequest::new(date)
        .with_headless(std::env::var("SEACE_HEADFUL").map_or(true, |v| v != "1"));
    if let Ok(path) = std::env::var("SEACE_REPORT") {
        request = request.with_report_path(path);
    }

    eprintln!("=== SEACE scrape for {} ===", date);

    let mut service = SeaceService::new();
    match service.call(request).await {
        Ok(result) => {
            eprintln!("{}", serde_json::to_string_pretty(&result.summary())?);
            if !result.outcome.is_completed() {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Scrape failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
