use std::path::PathBuf;
use std::time::Duration;

use crate::traits::By;

const SEACE_SEARCH_URL: &str =
    "https://prod2.seace.gob.pe/seacebus-uiwd-pub/buscadorPublico/buscadorPublico.xhtml";

/// Detail-view fields live under this fieldset
const DETAIL_FIELDSET: &str = "/html/body/div[3]/div/div/div/div/form/table[2]/tbody/tr[1]/td[1]/table/tbody/tr/td/fieldset/div/table/tbody";

/// Element addresses on the search and detail views
#[derive(Debug, Clone)]
pub struct Selectors {
    pub selection_tab_button: By,
    pub selection_tab: By,
    pub advanced_search: By,
    pub start_date: By,
    pub end_date: By,
    pub search_button: By,
    pub results_summary: By,
    /// Locale word that marks the "showing X of N" summary
    pub summary_marker: String,
    pub table_body: By,
    pub page_button: By,
    pub next_page: By,
    pub previous_page: By,
    pub active_class: String,
    pub disabled_class: String,
    pub return_button: By,
    pub nomenclature: By,
    pub entity: By,
    pub object_type: By,
    pub value: By,
    pub currency: By,
    pub legend: By,
    /// Caption of the disclosure that reveals the itemized listing
    pub listing_caption: String,
    pub items_content: By,
    pub winner_table: By,
}

impl Default for Selectors {
    fn default() -> Self {
        let field = |path: &str| By::xpath(format!("{}/{}", DETAIL_FIELDSET, path));

        Self {
            selection_tab_button: By::xpath("/html/body/div[3]/div/div[1]/ul/li[2]"),
            selection_tab: By::id("tbBuscador:tab1"),
            advanced_search: By::css(".ui-fieldset-legend"),
            start_date: By::id("tbBuscador:idFormBuscarProceso:dfechaInicio_input"),
            end_date: By::id("tbBuscador:idFormBuscarProceso:dfechaFin_input"),
            search_button: By::id("tbBuscador:idFormBuscarProceso:btnBuscarSelToken"),
            results_summary: By::css(".ui-paginator-current"),
            summary_marker: "Mostrando".to_string(),
            table_body: By::id("tbBuscador:idFormBuscarProceso:dtProcesos_data"),
            page_button: By::css(".ui-paginator-page"),
            next_page: By::css(".ui-paginator-next"),
            previous_page: By::css(".ui-paginator-prev"),
            active_class: "ui-state-active".to_string(),
            disabled_class: "ui-state-disabled".to_string(),
            return_button: By::xpath("//button[span[text()='Regresar']]"),
            nomenclature: field("tr[2]/td/table/tbody/tr[1]/td[2]"),
            entity: field("tr[6]/td/table/tbody/tr[1]/td[2]"),
            object_type: field("tr[9]/td/table/tbody/tr[1]/td[2]"),
            value: field("tr[9]/td/table/tbody/tr[3]/td[2]/span[1]"),
            currency: field("tr[9]/td/table/tbody/tr[3]/td[2]/span[2]"),
            legend: By::tag("legend"),
            listing_caption: "Ver listado".to_string(),
            items_content: By::id("tbFicha:idGridLstItems_content"),
            winner_table: By::id("tbFicha:idGridLstItems:0:dtParticipantes_data"),
        }
    }
}

/// Settle delays and polling ceilings
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// After opening the selection-procedures tab
    pub initial_settle: Duration,
    /// Between typing the start and end dates
    pub input_settle: Duration,
    /// After submitting the search
    pub search_settle: Duration,
    /// Results table body must appear within this
    pub page_load: Duration,
    /// Selection tab must become interactive within this
    pub element_wait: Duration,
    /// After each paginator click
    pub page_navigation: Duration,
    /// Detail view and list view markers must appear within this
    pub view_transition: Duration,
    /// After expanding the itemized listing
    pub listing_settle: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_secs(2),
            input_settle: Duration::from_secs(2),
            search_settle: Duration::from_secs(10),
            page_load: Duration::from_secs(10),
            element_wait: Duration::from_secs(30),
            page_navigation: Duration::from_secs(5),
            view_transition: Duration::from_secs(30),
            listing_settle: Duration::from_secs(1),
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub url: String,
    pub headless: bool,
    /// Chrome/Chromium binary; falls back to `CHROME_PATH` / `CHROMIUM_PATH`
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    pub screenshot_dir: PathBuf,
    /// Rows per results page, fixed by the site's rendering
    pub page_size: usize,
    /// Extra paginator steps allowed beyond the initial distance to the target
    pub navigation_slack: usize,
    pub selectors: Selectors,
    pub timeouts: Timeouts,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: SEACE_SEARCH_URL.to_string(),
            headless: true,
            chrome_path: None,
            window_size: (1920, 1080),
            screenshot_dir: PathBuf::from("screenshots"),
            page_size: 15,
            navigation_slack: 3,
            selectors: Selectors::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_screenshot_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = path.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Chrome binary from config, then environment
    pub fn resolve_chrome_path(&self) -> Option<PathBuf> {
        self.chrome_path.clone().or_else(|| {
            std::env::var("CHROME_PATH")
                .or_else(|_| std::env::var("CHROMIUM_PATH"))
                .ok()
                .map(PathBuf::from)
        })
    }
}

#[cfg(test)]
impl Timeouts {
    /// No waiting at all; the fake document settles instantly.
    pub fn immediate() -> Self {
        Self {
            initial_settle: Duration::ZERO,
            input_settle: Duration::ZERO,
            search_settle: Duration::ZERO,
            page_load: Duration::ZERO,
            element_wait: Duration::ZERO,
            page_navigation: Duration::ZERO,
            view_transition: Duration::ZERO,
            listing_settle: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }
}
