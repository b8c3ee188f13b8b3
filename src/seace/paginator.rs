//! Moves the results list to the page holding a given record.

use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{By, Document};
use crate::wait::{settle, SCROLL_TO_BOTTOM};

/// One-based page that renders the zero-based record `index`.
pub fn target_page(index: usize, page_size: usize) -> usize {
    index / page_size + 1
}

fn has_class(classes: &str, class: &str) -> bool {
    classes.split_whitespace().any(|c| c == class)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Paginator controls of the selection tab.
pub struct Paginator<'a, D: Document> {
    doc: &'a D,
    config: &'a ScraperConfig,
    tab: &'a D::Element,
}

impl<'a, D: Document> Paginator<'a, D> {
    pub fn new(doc: &'a D, config: &'a ScraperConfig, tab: &'a D::Element) -> Self {
        Self { doc, config, tab }
    }

    pub fn target_page(&self, index: usize) -> usize {
        target_page(index, self.config.page_size)
    }

    /// Clicks next/previous until `target` is the active page.
    ///
    /// Returns the number of paginator clicks. The walk is bounded by the
    /// starting distance plus the configured slack, and a reading that moves
    /// away from the target ends it early.
    pub async fn go_to(&self, target: usize) -> Result<usize, ScraperError> {
        let mut active = self.read_active_page(target).await?;
        if active == target {
            debug!("Ya en la página {}", target);
            return Ok(0);
        }

        let budget = active.abs_diff(target) + self.config.navigation_slack;
        let mut clicks = 0;

        while active != target {
            if clicks >= budget {
                return Err(ScraperError::navigation(
                    target,
                    format!("sigue en la página {} tras {} clics", active, clicks),
                ));
            }

            if active < target {
                info!("Avanzando de la página {} hacia {}", active, target);
                self.step(Direction::Forward, target).await?;
                // next/prev detach and re-render after a forward click
                self.doc
                    .execute_script(SCROLL_TO_BOTTOM)
                    .await
                    .map_err(|e| ScraperError::navigation(target, e))?;
            } else {
                info!("Retrocediendo de la página {} hacia {}", active, target);
                self.step(Direction::Backward, target).await?;
            }
            clicks += 1;

            let next = self.read_active_page(target).await?;
            if next.abs_diff(target) > active.abs_diff(target) {
                return Err(ScraperError::navigation(
                    target,
                    format!("la página activa se alejó de {} a {}", active, next),
                ));
            }
            active = next;
        }

        Ok(clicks)
    }

    /// Active page as rendered, scrolling once if the paginator is not there yet.
    async fn read_active_page(&self, target: usize) -> Result<usize, ScraperError> {
        if let Some(page) = self.active_page(target).await? {
            return Ok(page);
        }

        debug!("No hay página activa visible, desplazando para mostrar el paginador");
        self.doc
            .execute_script(SCROLL_TO_BOTTOM)
            .await
            .map_err(|e| ScraperError::navigation(target, e))?;

        self.active_page(target).await?.ok_or_else(|| {
            ScraperError::navigation(target, "ningún control de página está marcado como activo")
        })
    }

    async fn active_page(&self, target: usize) -> Result<Option<usize>, ScraperError> {
        let sel = &self.config.selectors;
        let buttons = self
            .doc
            .find_within(self.tab, &sel.page_button)
            .await
            .map_err(|e| ScraperError::navigation(target, e))?;

        for button in &buttons {
            let classes = self.class_list(button, target).await?;
            if !has_class(&classes, &sel.active_class) {
                continue;
            }

            let text = self
                .doc
                .text(button)
                .await
                .map_err(|e| ScraperError::navigation(target, e))?;
            let page = text.trim().parse().map_err(|_| {
                ScraperError::navigation(target, format!("la etiqueta de página activa {:?} no es un número", text))
            })?;
            return Ok(Some(page));
        }

        Ok(None)
    }

    /// Clicks the first enabled control for `direction` and waits for the list to settle.
    async fn step(&self, direction: Direction, target: usize) -> Result<(), ScraperError> {
        let sel = &self.config.selectors;
        let by: &By = match direction {
            Direction::Forward => &sel.next_page,
            Direction::Backward => &sel.previous_page,
        };

        let controls = self
            .doc
            .find_within(self.tab, by)
            .await
            .map_err(|e| ScraperError::navigation(target, e))?;

        for control in &controls {
            let classes = self.class_list(control, target).await?;
            if has_class(&classes, &sel.disabled_class) {
                continue;
            }

            self.doc
                .click(control)
                .await
                .map_err(|e| ScraperError::navigation(target, e))?;
            settle(self.config.timeouts.page_navigation).await;
            return Ok(());
        }

        Err(ScraperError::navigation(
            target,
            format!("los {} controles {} están deshabilitados o ausentes", controls.len(), by),
        ))
    }

    /// `class` attribute of a paginator control.
    ///
    /// A failed read is retried once; stale handles are common right after a
    /// re-render, but a second failure is treated as real.
    async fn class_list(&self, element: &D::Element, target: usize) -> Result<String, ScraperError> {
        match self.doc.attribute(element, "class").await {
            Ok(classes) => Ok(classes.unwrap_or_default()),
            Err(first) => {
                warn!("Falló la lectura de clase del paginador, reintentando una vez: {}", first);
                self.doc
                    .attribute(element, "class")
                    .await
                    .map(Option::unwrap_or_default)
                    .map_err(|e| ScraperError::navigation(target, e))
            }
        }
    }
}
