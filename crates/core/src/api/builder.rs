//! Builder pattern for table extraction.
//!
//! Provides a fluent API for configuring and executing extraction.
//!
//! # Example
//! ```ignore
//! use pdfrows_core::api::TableExtractor;
//!
//! let rows = TableExtractor::new("report.pdf")
//!     .page_range("2-4")?
//!     .starts_after("Balance sheet")
//!     .ends_before(regex::Regex::new("^Total")?)
//!     .extract_table()?;
//! for row in rows {
//!     println!("{}", row?.join("\t"));
//! }
//! ```

use crate::algorithm::AlgorithmChoice;
use crate::backend::{Backend, BackendKind, PageTexts, Source};
use crate::error::Result;
use crate::matcher::ObjectMatcher;
use crate::pages::PageSelection;

use super::high_level::{
    TableLines, TableOptions, extract_table, extract_table_with_backend, extract_text,
    number_of_pages,
};

/// A builder for configuring table and text extraction.
///
/// This wraps [`TableOptions`] and the extraction functions.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    source: Source,
    options: TableOptions,
}

impl TableExtractor {
    /// Creates a new TableExtractor for a path or in-memory document.
    ///
    /// # Example
    /// ```ignore
    /// let builder = TableExtractor::new("document.pdf");
    /// ```
    pub fn new(source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
            options: TableOptions::default(),
        }
    }

    /// Sets the pages to read.
    pub fn pages(mut self, pages: impl Into<PageSelection>) -> Self {
        self.options.pages = pages.into();
        self
    }

    /// Sets the pages to read from a range expression such as `"1,3,5-10"`.
    ///
    /// # Errors
    /// Returns `PdfError::MalformedRange` if the expression does not parse.
    pub fn page_range(mut self, ranges: &str) -> Result<Self> {
        self.options.pages = ranges.parse()?;
        Ok(self)
    }

    /// Sets the extraction algorithm.
    ///
    /// # Example
    /// ```ignore
    /// let builder = TableExtractor::new("document.pdf")
    ///     .algorithm(Algorithm::RectsBoundaries);
    /// ```
    pub fn algorithm(mut self, algorithm: impl Into<AlgorithmChoice>) -> Self {
        self.options.algorithm = algorithm.into();
        self
    }

    /// Starts reading at the first object matching `matcher`.
    pub fn starts_after(mut self, matcher: impl Into<ObjectMatcher>) -> Self {
        self.options.starts_after = Some(matcher.into());
        self
    }

    /// Stops reading at the first object matching `matcher`.
    pub fn ends_before(mut self, matcher: impl Into<ObjectMatcher>) -> Self {
        self.options.ends_before = Some(matcher.into());
        self
    }

    /// Sets the column tolerance; `None` derives it from the page.
    pub fn x_threshold(mut self, threshold: Option<f64>) -> Self {
        self.options.x_threshold = threshold;
        self
    }

    /// Sets the row tolerance; `None` derives it from the page.
    pub fn y_threshold(mut self, threshold: Option<f64>) -> Self {
        self.options.y_threshold = threshold;
        self
    }

    /// Forces a PDF engine instead of the default one.
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.options.backend = Some(backend);
        self
    }

    /// The options built so far.
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Consumes the builder and returns its options.
    pub fn into_options(self) -> TableOptions {
        self.options
    }

    /// Lazily extracts table rows.
    pub fn extract_table(self) -> Result<TableLines> {
        extract_table(self.source, self.options)
    }

    /// Lazily extracts table rows from a backend opened by the caller. The
    /// builder's source and backend kind are ignored.
    pub fn extract_table_from(self, backend: Box<dyn Backend>) -> Result<TableLines> {
        extract_table_with_backend(backend, self.options)
    }

    /// Lazily extracts the plain text of the selected pages.
    pub fn extract_text(self) -> Result<PageTexts> {
        extract_text(self.source, &self.options.pages, self.options.backend)
    }

    pub fn number_of_pages(&self) -> Result<usize> {
        number_of_pages(self.source.clone(), self.options.backend)
    }
}
