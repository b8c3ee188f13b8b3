//! Per-record detail round trips.

use std::path::PathBuf;

use base64::Engine;
use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;
use crate::error::{Phase, ScraperError};
use crate::traits::{By, Document, ReportSink};
use crate::wait::wait_for_element;

use super::extractor::FieldExtractor;
use super::paginator::Paginator;
use super::search::wait_selection_tab;
use super::types::{RowIdentifierTemplate, TraversalOutcome};

pub struct RecordTraversal<'a, D> {
    doc: &'a D,
    config: &'a ScraperConfig,
    template: &'a RowIdentifierTemplate,
}

impl<'a, D: Document> RecordTraversal<'a, D> {
    pub fn new(doc: &'a D, config: &'a ScraperConfig, template: &'a RowIdentifierTemplate) -> Self {
        Self {
            doc,
            config,
            template,
        }
    }

    /// Visits records `0..total` in order, stopping at the first failure.
    pub async fn run<S>(&self, total: usize, sink: &mut S) -> TraversalOutcome
    where
        S: ReportSink + ?Sized,
    {
        for index in 0..total {
            info!("Procesando registro {} de {}", index + 1, total);

            match self.process(index, sink).await {
                Ok(true) => debug!("Registro {} reportado", index + 1),
                Ok(false) => debug!("Registro {} omitido del reporte", index + 1),
                Err(cause) => {
                    error!("Falló el registro {}, se detiene el recorrido: {}", index + 1, cause);
                    self.capture_failure(index).await;
                    return TraversalOutcome::AbortedAt { index, cause };
                }
            }
        }

        TraversalOutcome::Completed { processed: total }
    }

    /// Open, extract, return. `Ok(true)` when a report line was written.
    async fn process<S>(&self, index: usize, sink: &mut S) -> Result<bool, ScraperError>
    where
        S: ReportSink + ?Sized,
    {
        let timeouts = &self.config.timeouts;
        let sel = &self.config.selectors;

        let tab = wait_selection_tab(self.doc, self.config, Phase::Pagination).await?;
        let paginator = Paginator::new(self.doc, self.config, &tab);
        paginator.go_to(paginator.target_page(index)).await?;

        let open = By::id(self.template.fill(index));
        let action = self
            .doc
            .find_one(&open)
            .await
            .map_err(ScraperError::driver(Phase::OpenDetail))?;
        self.doc
            .click(&action)
            .await
            .map_err(ScraperError::driver(Phase::OpenDetail))?;

        wait_for_element(self.doc, &sel.return_button, timeouts.view_transition, timeouts.poll_interval)
            .await
            .map_err(|t| t.during(Phase::OpenDetail))?;

        let emitted = FieldExtractor::new(self.doc, self.config)
            .extract_and_report(index, sink)
            .await?;

        let back = self
            .doc
            .find_one(&sel.return_button)
            .await
            .map_err(ScraperError::driver(Phase::ReturnToList))?;
        self.doc
            .click(&back)
            .await
            .map_err(ScraperError::driver(Phase::ReturnToList))?;

        wait_for_element(self.doc, &sel.advanced_search, timeouts.view_transition, timeouts.poll_interval)
            .await
            .map_err(|t| t.during(Phase::ReturnToList))?;

        Ok(emitted)
    }

    /// Best-effort screenshot of the failing state; never replaces the cause.
    async fn capture_failure(&self, index: usize) {
        let png = match self.doc.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!("No se pudo tomar la captura del registro {}: {}", index, e);
                return;
            }
        };

        match self.save_screenshot(index, &png) {
            Ok(path) => info!("Captura guardada en {:?}", path),
            Err(e) => {
                error!("No se pudo guardar la captura del registro {}: {}", index, e);
                let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
                debug!("Captura de error: data:image/png;base64,{}", encoded);
            }
        }
    }

    fn save_screenshot(&self, index: usize, png: &[u8]) -> std::io::Result<PathBuf> {
        let dir = &self.config.screenshot_dir;
        std::fs::create_dir_all(dir)?;

        let name = format!(
            "error_record_{}_{}.png",
            index,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(name);
        std::fs::write(&path, png)?;
        Ok(path)
    }
}
