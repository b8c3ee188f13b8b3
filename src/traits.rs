use async_trait::async_trait;

use crate::error::DriverError;
use crate::seace::ExtractedRecord;

/// Addressing scheme for an element lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum By {
    /// Exact `id` attribute
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression, evaluated from the document root
    XPath(String),
    /// Tag name
    TagName(String),
}

impl By {
    pub fn id(id: impl Into<String>) -> Self {
        By::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        By::XPath(expr.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        By::TagName(name.into())
    }

    /// The selector as text, for diagnostics.
    pub fn as_str(&self) -> &str {
        match self {
            By::Id(s) | By::Css(s) | By::XPath(s) | By::TagName(s) => s,
        }
    }
}

impl std::fmt::Display for By {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            By::Id(s) => write!(f, "id={}", s),
            By::Css(s) => write!(f, "css={}", s),
            By::XPath(s) => write!(f, "xpath={}", s),
            By::TagName(s) => write!(f, "tag={}", s),
        }
    }
}

/// The driven document: the remote page under automated control.
///
/// Every call completes before the next is issued; implementations need not
/// support concurrent use.
#[async_trait]
pub trait Document: Send + Sync {
    type Element: Send + Sync;

    /// First element matching `by`, or [`DriverError::NotFound`]
    async fn find_one(&self, by: &By) -> Result<Self::Element, DriverError>;

    /// All elements matching `by` (possibly empty)
    async fn find_all(&self, by: &By) -> Result<Vec<Self::Element>, DriverError>;

    /// Descendants of `parent` matching `by`
    async fn find_within(
        &self,
        parent: &Self::Element,
        by: &By,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// First descendant of `parent` matching `by`, or [`DriverError::NotFound`]
    async fn find_one_within(
        &self,
        parent: &Self::Element,
        by: &By,
    ) -> Result<Self::Element, DriverError> {
        self.find_within(parent, by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound(by.to_string()))
    }

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn execute_script(&self, script: &str) -> Result<(), DriverError>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;
}

/// Destination for extracted records.
pub trait ReportSink {
    /// Writes the column header line
    fn header(&mut self) -> std::io::Result<()>;

    /// Writes one record line
    fn emit(&mut self, record: &ExtractedRecord) -> std::io::Result<()>;
}
