//! SEACE data types

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// Date range query; the same day is used as start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCriteria {
    date: NaiveDate,
}

impl SearchCriteria {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `DD/MM/YYYY`, as the date inputs expect
    pub fn formatted(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Identifier of a row's "open detail" action with the record index left open.
///
/// Built from row 0, so it addresses records by global index. A filled
/// identifier only resolves while the page holding that record is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdentifierTemplate {
    prefix: String,
    suffix: String,
}

impl RowIdentifierTemplate {
    const ZERO_MARKER: &'static str = ":0:";

    /// Replaces the first `:0:` in `raw_id`; `None` when there is none.
    pub fn from_first_row(raw_id: &str) -> Option<Self> {
        let at = raw_id.find(Self::ZERO_MARKER)?;
        Some(Self {
            prefix: raw_id[..at + 1].to_string(),
            suffix: raw_id[at + Self::ZERO_MARKER.len() - 1..].to_string(),
        })
    }

    pub fn fill(&self, index: usize) -> String {
        format!("{}{}{}", self.prefix, index, self.suffix)
    }
}

impl fmt::Display for RowIdentifierTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%d{}", self.prefix, self.suffix)
    }
}

/// Fields read from one detail view that has a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// One-based position in the result list
    pub sequence_id: usize,
    pub entity: String,
    pub nomenclature: String,
    pub object_type: String,
    pub description: String,
    pub value: String,
    pub currency: String,
    pub winner_name: String,
    /// MYPE (small business) flag as rendered
    pub small_business: String,
    /// Jungle-region flag as rendered
    pub jungle_region: String,
}

/// How a detail view was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Winner(ExtractedRecord),
    NoWinner { sequence_id: usize, description: String },
}

/// Terminal state of a traversal.
#[derive(Debug)]
pub enum TraversalOutcome {
    Completed { processed: usize },
    AbortedAt { index: usize, cause: ScraperError },
}

impl TraversalOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TraversalOutcome::Completed { .. })
    }
}

/// Serializable view of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSummary {
    pub date: NaiveDate,
    pub total_records: usize,
    pub emitted: usize,
    pub completed: bool,
    pub aborted_at: Option<usize>,
    pub error: Option<String>,
}
