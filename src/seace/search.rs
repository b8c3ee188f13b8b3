use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::{Phase, ScraperError};
use crate::traits::Document;
use crate::wait::{settle, wait_for_interactive, SCROLL_TO_BOTTOM};

use super::types::SearchCriteria;

/// Switches to the "selection procedures" tab of the search page.
pub async fn open_selection_tab<D: Document>(
    doc: &D,
    config: &ScraperConfig,
) -> Result<(), ScraperError> {
    let button = doc
        .find_one(&config.selectors.selection_tab_button)
        .await
        .map_err(ScraperError::driver(Phase::Setup))?;
    doc.click(&button)
        .await
        .map_err(ScraperError::driver(Phase::Setup))?;

    settle(config.timeouts.initial_settle).await;
    debug!("Pestaña de procedimientos de selección abierta");
    Ok(())
}

/// Waits until the selection tab panel is displayed and enabled.
pub async fn wait_selection_tab<D: Document>(
    doc: &D,
    config: &ScraperConfig,
    phase: Phase,
) -> Result<D::Element, ScraperError> {
    wait_for_interactive(
        doc,
        &config.selectors.selection_tab,
        config.timeouts.element_wait,
        config.timeouts.poll_interval,
    )
    .await
    .map_err(|t| t.during(phase))
}

/// Fills both date inputs with the criteria's date and presses search.
///
/// Every control is looked up inside `tab`; the other tabs carry their own
/// hidden copies of the same fieldsets.
pub async fn submit_search<D: Document>(
    doc: &D,
    config: &ScraperConfig,
    tab: &D::Element,
    criteria: &SearchCriteria,
) -> Result<(), ScraperError> {
    let sel = &config.selectors;
    let date = criteria.formatted();

    let advanced = doc
        .find_one_within(tab, &sel.advanced_search)
        .await
        .map_err(ScraperError::driver(Phase::Search))?;
    doc.click(&advanced)
        .await
        .map_err(ScraperError::driver(Phase::Search))?;
    settle(config.timeouts.input_settle).await;

    for input in [&sel.start_date, &sel.end_date] {
        let element = doc
            .find_one_within(tab, input)
            .await
            .map_err(ScraperError::driver(Phase::Search))?;
        doc.type_text(&element, &date)
            .await
            .map_err(ScraperError::driver(Phase::Search))?;
        debug!("{} <- {}", input, date);
        settle(config.timeouts.input_settle).await;
    }

    let button = doc
        .find_one_within(tab, &sel.search_button)
        .await
        .map_err(ScraperError::driver(Phase::Search))?;
    doc.click(&button)
        .await
        .map_err(ScraperError::driver(Phase::Search))?;

    info!("Búsqueda enviada para {}", date);
    Ok(())
}

/// Submits the search, lets the list populate, and scrolls to the bottom so
/// the paginator renders.
pub async fn search<D: Document>(
    doc: &D,
    config: &ScraperConfig,
    tab: &D::Element,
    criteria: &SearchCriteria,
) -> Result<(), ScraperError> {
    submit_search(doc, config, tab, criteria).await?;
    settle(config.timeouts.search_settle).await;

    doc.execute_script(SCROLL_TO_BOTTOM)
        .await
        .map_err(ScraperError::driver(Phase::Search))?;
    Ok(())
}
