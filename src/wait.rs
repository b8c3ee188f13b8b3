//! Polling helpers over a [`Document`].

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::debug;

use crate::error::{DriverError, Phase, ScraperError};
use crate::traits::{By, Document};

/// A wait that never saw its condition hold.
#[derive(Debug, Clone)]
pub struct TimedOut {
    pub selector: String,
    pub waited: Duration,
}

impl TimedOut {
    pub fn during(self, phase: Phase) -> ScraperError {
        ScraperError::Timeout {
            phase,
            selector: self.selector,
            waited: self.waited,
        }
    }
}

/// Polls until `by` resolves, trying at least once.
pub async fn wait_for_element<D>(
    doc: &D,
    by: &By,
    timeout: Duration,
    poll: Duration,
) -> Result<D::Element, TimedOut>
where
    D: Document + ?Sized,
{
    let start = Instant::now();

    loop {
        match doc.find_one(by).await {
            Ok(element) => return Ok(element),
            Err(DriverError::NotFound(_)) => {}
            Err(e) => debug!("esperando {}: {}", by, e),
        }

        if start.elapsed() >= timeout {
            return Err(TimedOut {
                selector: by.to_string(),
                waited: start.elapsed(),
            });
        }
        sleep(poll).await;
    }
}

/// Polls until `by` resolves to an element that is both displayed and enabled.
pub async fn wait_for_interactive<D>(
    doc: &D,
    by: &By,
    timeout: Duration,
    poll: Duration,
) -> Result<D::Element, TimedOut>
where
    D: Document + ?Sized,
{
    let start = Instant::now();

    loop {
        if let Ok(element) = doc.find_one(by).await {
            let displayed = doc.is_displayed(&element).await.unwrap_or(false);
            let enabled = displayed && doc.is_enabled(&element).await.unwrap_or(false);
            if enabled {
                return Ok(element);
            }
        }

        if start.elapsed() >= timeout {
            return Err(TimedOut {
                selector: by.to_string(),
                waited: start.elapsed(),
            });
        }
        sleep(poll).await;
    }
}

/// Fixed pause that lets the page re-render after a mutating action.
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
