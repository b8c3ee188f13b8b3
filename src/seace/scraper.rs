//! SEACE scraper pipeline
//!
//! Search → count → row template → per-record traversal.

use tracing::info;

use crate::config::ScraperConfig;
use crate::error::{Phase, ScraperError};
use crate::traits::{Document, ReportSink};

use super::count::resolve_total;
use super::row_template::infer_row_template;
use super::search::{open_selection_tab, search, wait_selection_tab};
use super::traversal::RecordTraversal;
use super::types::{SearchCriteria, TraversalOutcome};

/// What a run found and how far it got.
#[derive(Debug)]
pub struct RunReport {
    pub total_records: usize,
    pub outcome: TraversalOutcome,
}

/// Drives one search over an already opened document.
pub struct SeaceScraper<'a, D> {
    doc: &'a D,
    config: &'a ScraperConfig,
}

impl<'a, D: Document> SeaceScraper<'a, D> {
    pub fn new(doc: &'a D, config: &'a ScraperConfig) -> Self {
        Self { doc, config }
    }

    /// Runs the whole pipeline for `criteria`, writing winners to `sink`.
    ///
    /// Errors before the traversal starts are returned as `Err`; failures
    /// while visiting records end up in [`RunReport::outcome`].
    pub async fn run<S>(&self, criteria: &SearchCriteria, sink: &mut S) -> Result<RunReport, ScraperError>
    where
        S: ReportSink + ?Sized,
    {
        info!("Iniciando búsqueda para {}", criteria.date());

        open_selection_tab(self.doc, self.config).await?;
        let tab = wait_selection_tab(self.doc, self.config, Phase::Search).await?;
        search(self.doc, self.config, &tab, criteria).await?;

        // the search re-renders the tab, so the old handle is stale
        let tab = wait_selection_tab(self.doc, self.config, Phase::ResultCount).await?;
        let total_records = resolve_total(self.doc, self.config, &tab).await?;
        if total_records == 0 {
            info!("No se encontraron registros para {}", criteria.date());
            return Ok(RunReport {
                total_records,
                outcome: TraversalOutcome::Completed { processed: 0 },
            });
        }
        info!("Total de registros: {}", total_records);

        let template = infer_row_template(self.doc, self.config).await?;
        info!("Plantilla de identificador de fila: {}", template);

        sink.header()?;
        let outcome = RecordTraversal::new(self.doc, self.config, &template)
            .run(total_records, sink)
            .await;

        match &outcome {
            TraversalOutcome::Completed { processed } => {
                info!("Ejecución terminada, {} registros procesados", processed)
            }
            TraversalOutcome::AbortedAt { index, .. } => {
                info!("Ejecución interrumpida en el registro {} de {}", index + 1, total_records)
            }
        }

        Ok(RunReport {
            total_records,
            outcome,
        })
    }
}
