//! SEACE scraper library
//!
//! - Searches the SEACE public procurement portal for one publication date
//! - Visits every result's detail view and reports the awarded winner
//!
//! # Service usage
//!
//! ```rust,ignore
//! use seace_scraper::{ScrapeRequest, SeaceService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = SeaceService::new();
//!
//!     let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//!     let request = ScrapeRequest::new(date)
//!         .with_report_path("./reports/2024-06-30.csv")
//!         .with_headless(false);
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("{:?}", result.summary());
//! }
//! ```
//!
//! # Driving a session directly
//!
//! ```rust,ignore
//! use seace_scraper::seace::{ReportWriter, SearchCriteria, SeaceScraper};
//! use seace_scraper::{ChromiumSession, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::default();
//!     let session = ChromiumSession::launch(&config).await.unwrap();
//!
//!     let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//!     let mut sink = ReportWriter::stdout();
//!     let report = SeaceScraper::new(&session, &config)
//!         .run(&SearchCriteria::new(date), &mut sink)
//!         .await;
//!     session.close().await;
//!
//!     println!("{:?}", report.unwrap().outcome);
//! }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod seace;
pub mod service;
pub mod traits;
pub mod wait;

#[cfg(test)]
mod fake;

// Main types
pub use browser::ChromiumSession;
pub use config::{ScraperConfig, Selectors, Timeouts};
pub use error::{DriverError, ErrorKind, Phase, ScraperError};
pub use service::{ScrapeRequest, ScrapeResult, SeaceService};
pub use traits::{By, Document, ReportSink};

pub use seace::{
    ExtractedRecord, RowIdentifierTemplate, ScrapeSummary, SearchCriteria, SeaceScraper,
    TraversalOutcome,
};
