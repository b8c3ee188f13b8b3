//! Chrome DevTools backed [`Document`].

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::{DriverError, ScraperError};
use crate::traits::{By, Document};

const IS_DISPLAYED_JS: &str = r#"
    function() {
        const rect = this.getBoundingClientRect();
        const style = window.getComputedStyle(this);
        return rect.width > 0 && rect.height > 0 &&
               style.display !== 'none' && style.visibility !== 'hidden';
    }
"#;

const IS_ENABLED_JS: &str = "function() { return !this.disabled; }";

/// CSS equivalent of a lookup; XPath has no CSS form.
fn css_for(by: &By) -> Option<String> {
    match by {
        // JSF ids contain ':' which would need escaping in #id form
        By::Id(id) => Some(format!(
            "[id=\"{}\"]",
            id.replace('\\', "\\\\").replace('"', "\\\"")
        )),
        By::Css(selector) | By::TagName(selector) => Some(selector.clone()),
        By::XPath(_) => None,
    }
}

fn protocol(e: impl std::fmt::Display) -> DriverError {
    DriverError::Protocol(e.to_string())
}

/// One browser process with a single tab on the search page.
///
/// Call [`close`](Self::close) when done; dropping the session also stops the
/// event handler, and chromiumoxide kills the browser process on drop.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launches the browser and opens the configured URL.
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        info!("Iniciando navegador...");

        let (width, height) = config.window_size;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .no_sandbox()
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if let Some(path) = config.resolve_chrome_path() {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("configuración del navegador: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Error de evento del navegador: {:?}", e);
                }
            }
        });

        let page = browser
            .new_page(config.url.as_str())
            .await
            .map_err(|e| ScraperError::BrowserInit(format!("no se pudo abrir {}: {}", config.url, e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::BrowserInit(format!("no se pudo cargar {}: {}", config.url, e)))?;

        info!("Navegador iniciado en {}", config.url);
        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Closes the browser and waits for the process to exit.
    pub async fn close(mut self) {
        info!("Cerrando navegador...");
        if let Err(e) = self.browser.close().await {
            warn!("Falló el cierre del navegador: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Falló la espera de salida del navegador: {}", e);
        }
        self.handler.abort();
        info!("Navegador cerrado");
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl Document for ChromiumSession {
    type Element = Element;

    async fn find_one(&self, by: &By) -> Result<Element, DriverError> {
        let found = match css_for(by) {
            Some(css) => self.page.find_element(css).await,
            None => self.page.find_xpath(by.as_str()).await,
        };
        // a missing node surfaces as a protocol error from DOM.describeNode
        found.map_err(|e| DriverError::NotFound(format!("{} ({})", by, e)))
    }

    async fn find_all(&self, by: &By) -> Result<Vec<Element>, DriverError> {
        match css_for(by) {
            Some(css) => self.page.find_elements(css).await.map_err(protocol),
            None => self.page.find_xpaths(by.as_str()).await.map_err(protocol),
        }
    }

    async fn find_within(&self, parent: &Element, by: &By) -> Result<Vec<Element>, DriverError> {
        let css = css_for(by).ok_or_else(|| {
            DriverError::Unsupported(format!("{} no se puede buscar dentro de un elemento", by))
        })?;
        parent.find_elements(css).await.map_err(protocol)
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await.map(|_| ()).map_err(protocol)
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), DriverError> {
        element.click().await.map_err(protocol)?;
        element.type_str(text).await.map(|_| ()).map_err(protocol)
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        element
            .inner_text()
            .await
            .map(Option::unwrap_or_default)
            .map_err(protocol)
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, DriverError> {
        element.attribute(name).await.map_err(protocol)
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool, DriverError> {
        let returns = element.call_js_fn(IS_DISPLAYED_JS, false).await.map_err(protocol)?;
        Ok(returns
            .result
            .value
            .and_then(|v: serde_json::Value| v.as_bool())
            .unwrap_or(false))
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool, DriverError> {
        let returns = element.call_js_fn(IS_ENABLED_JS, false).await.map_err(protocol)?;
        Ok(returns
            .result
            .value
            .and_then(|v: serde_json::Value| v.as_bool())
            .unwrap_or(true))
    }

    async fn execute_script(&self, script: &str) -> Result<(), DriverError> {
        self.page.evaluate(script).await.map(|_| ()).map_err(protocol)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(protocol)
    }
}
