//! High-level extraction API.
//!
//! Provides the main public entry points:
//! - `extract_text()` - lazy plain text, one string per selected page
//! - `document_text()` - every page's text as one string
//! - `number_of_pages()` - page count of a document
//! - `extract_table()` - lazy table rows built by an extraction algorithm

use tracing::debug;

use crate::algorithm::{AlgorithmChoice, AlgorithmInput};
use crate::backend::{
    Backend, BackendKind, PageObjects, PageTexts, PageWindow, Source, open_backend,
};
use crate::error::Result;
use crate::geometry::{AxisOrder, PageObject, TextObject};
use crate::matcher::ObjectMatcher;
use crate::pages::PageSelection;

/// Default grouping tolerance on both axes, in points.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Options for table extraction.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// 1-based pages to read. Defaults to every page.
    pub pages: PageSelection,

    /// Strategy turning a page's objects into cells.
    pub algorithm: AlgorithmChoice,

    /// Start reading at the first object matching this (the object itself
    /// is kept).
    pub starts_after: Option<ObjectMatcher>,

    /// Stop reading the document at the first object matching this.
    pub ends_before: Option<ObjectMatcher>,

    /// Column grouping tolerance. `None` derives one from the objects.
    pub x_threshold: Option<f64>,

    /// Row grouping tolerance. `None` derives one from the objects.
    pub y_threshold: Option<f64>,

    /// PDF engine. `None` picks the first available one.
    pub backend: Option<BackendKind>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            pages: PageSelection::All,
            algorithm: AlgorithmChoice::default(),
            starts_after: None,
            ends_before: None,
            x_threshold: Some(DEFAULT_THRESHOLD),
            y_threshold: Some(DEFAULT_THRESHOLD),
            backend: None,
        }
    }
}

/// Join a cell's objects into one string, top object first.
///
/// Texts are trimmed and separated by newlines. An empty-cell marker (or
/// an empty cell) renders as `""`.
pub fn cell_text(cell: Option<&[&TextObject]>, y_order: AxisOrder) -> String {
    let Some(objects) = cell else {
        return String::new();
    };
    let mut objects = objects.to_vec();
    objects.sort_by(|a, b| y_order.key(a.y0).total_cmp(&y_order.key(b.y0)));
    objects
        .iter()
        .map(|obj| obj.text.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain text of the selected pages, read lazily.
pub fn extract_text(
    source: impl Into<Source>,
    pages: &PageSelection,
    backend: Option<BackendKind>,
) -> Result<PageTexts> {
    Ok(PageTexts::new(open_backend(backend, source)?, pages))
}

/// Text of every page, pages separated by a blank line.
pub fn document_text(source: impl Into<Source>, backend: Option<BackendKind>) -> Result<String> {
    let pages = extract_text(source, &PageSelection::All, backend)?.collect::<Result<Vec<_>>>()?;
    Ok(pages.join("\n\n"))
}

pub fn number_of_pages(source: impl Into<Source>, backend: Option<BackendKind>) -> Result<usize> {
    open_backend(backend, source)?.page_count()
}

/// Rows of the table found on the selected pages.
///
/// The document is opened with `options.backend` (or the default engine).
pub fn extract_table(source: impl Into<Source>, options: TableOptions) -> Result<TableLines> {
    let backend = open_backend(options.backend, source)?;
    extract_table_with_backend(backend, options)
}

/// Like [`extract_table`] over an already opened backend. `options.backend`
/// is ignored.
///
/// Nothing is read from the backend until the first row is requested; a
/// document that cannot be read fails as the first item.
pub fn extract_table_with_backend(
    backend: Box<dyn Backend>,
    options: TableOptions,
) -> Result<TableLines> {
    let TableOptions {
        pages,
        algorithm,
        starts_after,
        ends_before,
        x_threshold,
        y_threshold,
        backend: _,
    } = options;
    let x_order = backend.x_order();
    let y_order = backend.y_order();
    debug!(
        backend = backend.name(),
        algorithm = algorithm.name(),
        ?x_threshold,
        ?y_threshold,
        "extracting table"
    );
    let pages = PageObjects::new(backend, &pages, PageWindow::new(starts_after, ends_before));
    Ok(TableLines {
        pages,
        algorithm,
        x_threshold,
        y_threshold,
        x_order,
        y_order,
        pending: Vec::new().into_iter(),
        header: None,
        page_index: 0,
        failed: false,
    })
}

/// Lazy table rows, one `Vec<String>` per line.
///
/// The first line of the first page is the header. On every later page a
/// first line equal to the header is dropped. Iteration stops after the
/// first error.
pub struct TableLines {
    pages: PageObjects,
    algorithm: AlgorithmChoice,
    x_threshold: Option<f64>,
    y_threshold: Option<f64>,
    x_order: AxisOrder,
    y_order: AxisOrder,
    pending: std::vec::IntoIter<Vec<String>>,
    header: Option<Vec<String>>,
    page_index: usize,
    failed: bool,
}

impl TableLines {
    /// The header captured from the first page, once it has been read.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn backend_name(&self) -> &'static str {
        self.pages.backend().name()
    }

    fn page_lines(&self, objects: Vec<PageObject>) -> Result<Vec<Vec<String>>> {
        let input = AlgorithmInput::new(
            objects,
            self.x_threshold,
            self.y_threshold,
            self.x_order,
            self.y_order,
        );
        let extractor = self.algorithm.build(input);
        let lines = extractor.lines()?;
        Ok(lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|cell| cell_text(cell.as_deref(), self.y_order))
                    .collect()
            })
            .collect())
    }
}

impl Iterator for TableLines {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(line) = self.pending.next() {
                return Some(Ok(line));
            }

            let mut lines = match self.pages.next()?.and_then(|objects| self.page_lines(objects)) {
                Ok(lines) => lines,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };

            let page_index = self.page_index;
            self.page_index += 1;
            if page_index == 0 {
                self.header = lines.first().cloned();
            } else if !lines.is_empty() && self.header.as_ref() == lines.first() {
                debug!(page_index, "skipping repeated header");
                lines.remove(0);
            }
            self.pending = lines.into_iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_joins_top_object_first() {
        let upper = TextObject::new(0.0, 20.0, 10.0, 30.0, " first ");
        let lower = TextObject::new(0.0, 5.0, 10.0, 15.0, "second");
        let cell = [&lower, &upper];
        assert_eq!(cell_text(Some(&cell[..]), AxisOrder::Descending), "first\nsecond");
        assert_eq!(cell_text(Some(&cell[..]), AxisOrder::Ascending), "second\nfirst");
        assert_eq!(cell_text(None, AxisOrder::Ascending), "");
        assert_eq!(cell_text(Some(&[][..]), AxisOrder::Ascending), "");
    }

    #[test]
    fn default_options_use_half_point_thresholds() {
        let options = TableOptions::default();
        assert_eq!(options.x_threshold, Some(0.5));
        assert_eq!(options.y_threshold, Some(0.5));
        assert_eq!(options.algorithm.name(), "y-groups");
        assert_eq!(options.pages, PageSelection::All);
        assert!(options.backend.is_none());
    }
}
