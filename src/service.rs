use std::fs::File;
use std::future::Future;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::NaiveDate;
use tower::Service;
use tracing::info;

use crate::browser::ChromiumSession;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::seace::{
    CountingSink, ReportWriter, ScrapeSummary, SeaceScraper, SearchCriteria, TraversalOutcome,
};

/// One search date to scrape.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub date: NaiveDate,
    pub headless: bool,
    pub screenshot_dir: Option<PathBuf>,
    /// Report file; stdout when unset
    pub report_path: Option<PathBuf>,
    pub chrome_path: Option<PathBuf>,
}

impl ScrapeRequest {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            headless: true,
            screenshot_dir: None,
            report_path: None,
            chrome_path: None,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_screenshot_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(path.into());
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Overlays this request's settings on `base`.
    pub fn configure(&self, base: ScraperConfig) -> ScraperConfig {
        let mut config = base.with_headless(self.headless);
        if let Some(dir) = &self.screenshot_dir {
            config = config.with_screenshot_dir(dir);
        }
        if let Some(path) = &self.chrome_path {
            config = config.with_chrome_path(path);
        }
        config
    }

    fn open_report(&self) -> io::Result<Box<dyn Write + Send>> {
        match &self.report_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Ok(Box::new(BufWriter::new(File::create(path)?)))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }
}

impl From<ScrapeRequest> for ScraperConfig {
    fn from(req: ScrapeRequest) -> Self {
        req.configure(ScraperConfig::default())
    }
}

/// Result of one scrape
#[derive(Debug)]
pub struct ScrapeResult {
    pub date: NaiveDate,
    pub total_records: usize,
    /// Report lines written, header excluded
    pub emitted: usize,
    pub outcome: TraversalOutcome,
    pub report_path: Option<PathBuf>,
}

impl ScrapeResult {
    pub fn summary(&self) -> ScrapeSummary {
        let (completed, aborted_at, error) = match &self.outcome {
            TraversalOutcome::Completed { .. } => (true, None, None),
            TraversalOutcome::AbortedAt { index, cause } => {
                (false, Some(*index), Some(cause.to_string()))
            }
        };
        ScrapeSummary {
            date: self.date,
            total_records: self.total_records,
            emitted: self.emitted,
            completed,
            aborted_at,
            error,
        }
    }
}

/// SEACE scraper as a tower::Service; one browser session per request.
#[derive(Debug, Clone, Default)]
pub struct SeaceService {
    config: ScraperConfig,
}

impl SeaceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base configuration that each request is applied on top of.
    pub fn with_config(config: ScraperConfig) -> Self {
        Self { config }
    }
}

impl Service<ScrapeRequest> for SeaceService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("Solicitud recibida: fecha={}", req.date);
        let config = req.configure(self.config.clone());

        Box::pin(async move {
            let mut writer = ReportWriter::new(req.open_report()?);
            let mut sink = CountingSink::new(&mut writer);

            let session = ChromiumSession::launch(&config).await?;
            let run = SeaceScraper::new(&session, &config)
                .run(&SearchCriteria::new(req.date), &mut sink)
                .await;
            session.close().await;

            let report = run?;
            let result = ScrapeResult {
                date: req.date,
                total_records: report.total_records,
                emitted: sink.emitted(),
                outcome: report.outcome,
                report_path: req.report_path,
            };

            info!(
                "Búsqueda terminada: fecha={}, total={}, emitidos={}, completa={}",
                result.date,
                result.total_records,
                result.emitted,
                result.outcome.is_completed()
            );

            Ok(result)
        })
    }
}
