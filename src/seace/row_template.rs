use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{DriverError, Phase, ScraperError};
use crate::traits::{By, Document};
use crate::wait::wait_for_element;

use super::types::RowIdentifierTemplate;

/// Column holding the row's action links
const ACTION_COLUMN: usize = 12;
/// Second link of the cluster opens the detail view
const OPEN_ACTION: usize = 1;

/// Derives the "open detail" identifier template from the first result row.
pub async fn infer_row_template<D: Document>(
    doc: &D,
    config: &ScraperConfig,
) -> Result<RowIdentifierTemplate, ScraperError> {
    let err = |e: DriverError| ScraperError::driver(Phase::RowTemplate)(e);
    let precondition = |detail: String| ScraperError::precondition(Phase::RowTemplate, detail);

    let body = wait_for_element(
        doc,
        &config.selectors.table_body,
        config.timeouts.page_load,
        config.timeouts.poll_interval,
    )
    .await
    .map_err(|t| t.during(Phase::RowTemplate))?;

    let rows = doc.find_within(&body, &By::tag("tr")).await.map_err(err)?;
    let first = rows
        .first()
        .ok_or_else(|| precondition("la tabla de resultados no tiene filas".into()))?;

    let cells = doc.find_within(first, &By::tag("td")).await.map_err(err)?;
    let actions_cell = cells.get(ACTION_COLUMN).ok_or_else(|| {
        precondition(format!(
            "la primera fila tiene {} celdas, se esperaban al menos {}; el diseño pudo cambiar",
            cells.len(),
            ACTION_COLUMN + 1
        ))
    })?;

    let actions = doc
        .find_within(actions_cell, &By::tag("a"))
        .await
        .map_err(err)?;
    let open = actions.get(OPEN_ACTION).ok_or_else(|| {
        precondition(format!(
            "la primera fila tiene {} acciones, se esperaban al menos {}",
            actions.len(),
            OPEN_ACTION + 1
        ))
    })?;

    let raw_id = doc
        .attribute(open, "id")
        .await
        .map_err(err)?
        .ok_or_else(|| precondition("la acción de ver detalle no tiene id".into()))?;
    debug!("Id de la acción de la primera fila: {}", raw_id);

    RowIdentifierTemplate::from_first_row(&raw_id)
        .ok_or_else(|| precondition(format!("{:?} no contiene el marcador de fila :0:", raw_id)))
}
