use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{Phase, ScraperError};
use crate::traits::Document;

/// Position of the total in "Mostrando 1 - 15 de un total de 42 registros".
/// Tied to the sentence template; re-derive it if the template changes.
const TOTAL_TOKEN: usize = 8;

/// Pulls the total record count out of a pagination summary sentence.
pub fn parse_total(summary: &str) -> Result<usize, ScraperError> {
    let token = summary.split_whitespace().nth(TOTAL_TOKEN).ok_or_else(|| {
        ScraperError::precondition(
            Phase::ResultCount,
            format!("el resumen no contiene un total: {:?}", summary),
        )
    })?;

    token.parse().map_err(|e| {
        ScraperError::precondition(
            Phase::ResultCount,
            format!("el total {:?} en {:?} no es un número: {}", token, summary, e),
        )
    })
}

/// Reads the paginator summary inside `tab` and returns how many records the
/// search found.
pub async fn resolve_total<D: Document>(
    doc: &D,
    config: &ScraperConfig,
    tab: &D::Element,
) -> Result<usize, ScraperError> {
    let sel = &config.selectors;
    let candidates = doc
        .find_within(tab, &sel.results_summary)
        .await
        .map_err(ScraperError::driver(Phase::ResultCount))?;

    for candidate in &candidates {
        let text = doc
            .text(candidate)
            .await
            .map_err(ScraperError::driver(Phase::ResultCount))?;
        if text.contains(&sel.summary_marker) {
            debug!("Resumen de paginación: {}", text);
            return parse_total(&text);
        }
    }

    Err(ScraperError::precondition(
        Phase::ResultCount,
        format!(
            "ninguno de los {} nodos {} menciona {:?}",
            candidates.len(),
            sel.results_summary,
            sel.summary_marker
        ),
    ))
}
