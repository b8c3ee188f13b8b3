//! SEACE scraper module
//!
//! Searches Peru's public procurement portal for one day and reports every
//! process that has an awarded winner.

mod count;
mod extractor;
mod paginator;
mod report;
mod row_template;
mod scraper;
mod search;
mod traversal;
mod types;

pub use count::{parse_total, resolve_total};
pub use extractor::FieldExtractor;
pub use paginator::{target_page, Paginator};
pub use report::{record_line, CountingSink, ReportWriter};
pub use row_template::infer_row_template;
pub use scraper::{RunReport, SeaceScraper};
pub use search::{open_selection_tab, search, submit_search, wait_selection_tab};
pub use traversal::RecordTraversal;
pub use types::{
    ExtractedRecord, Extraction, RowIdentifierTemplate, ScrapeSummary, SearchCriteria,
    TraversalOutcome,
};
