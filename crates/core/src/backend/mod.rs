//! Page backends: where positioned objects come from.
//!
//! A [`Backend`] wraps one PDF engine behind a page-indexed interface. The
//! engines disagree on object shapes and on which way the y axis points;
//! each backend converts to [`PageObject`]s and reports its native
//! [`AxisOrder`] so that sorting and cell joining stay correct.
//!
//! [`PageObjects`] walks the selected pages of a backend, sorts each page
//! into reading order and applies the `starts_after` / `ends_before`
//! window.

mod memory;
#[cfg(feature = "pdf-extract")]
mod pdf_extract;
#[cfg(feature = "pdfium")]
mod pdfium;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{PdfError, Result};
use crate::geometry::{AxisOrder, PageObject, TextObject, reading_order};
use crate::matcher::ObjectMatcher;
use crate::pages::PageSelection;

pub use self::memory::MemoryBackend;
#[cfg(feature = "pdf-extract")]
pub use self::pdf_extract::{LayoutParams, PdfExtractBackend};
#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumBackend;

/// A PDF engine exposing page count, page text and page objects.
///
/// Page indices are 0-based. Methods take `&mut self` so that engines can
/// open their document on first use.
pub trait Backend {
    fn name(&self) -> &'static str;

    fn x_order(&self) -> AxisOrder {
        AxisOrder::Ascending
    }

    /// Direction in which the engine's y coordinates advance down the page.
    fn y_order(&self) -> AxisOrder;

    fn page_count(&mut self) -> Result<usize>;

    /// Plain text of one page.
    fn page_text(&mut self, index: usize) -> Result<String>;

    /// Text and rectangle objects of one page, in engine order.
    fn all_objects(&mut self, index: usize) -> Result<Vec<PageObject>>;

    fn text_objects(&mut self, index: usize) -> Result<Vec<TextObject>> {
        Ok(self
            .all_objects(index)?
            .into_iter()
            .filter_map(|obj| match obj {
                PageObject::Text(text) => Some(text),
                PageObject::Rect(_) => None,
            })
            .collect())
    }
}

/// Where a document is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl Source {
    /// Raw document bytes, reading the file if needed.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Source::Path(path) => std::fs::read(path).map(Cow::Owned).map_err(|err| {
                PdfError::Resource(format!("{}: {err}", path.display()))
            }),
            Source::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

/// The PDF engines this crate can drive, addressable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    PdfExtract,
    Pdfium,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::PdfExtract, BackendKind::Pdfium];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::PdfExtract => "pdf-extract",
            BackendKind::Pdfium => "pdfium",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    /// Whether the engine was compiled in and, for pdfium, its native
    /// library can be bound.
    pub fn is_available(self) -> bool {
        match self {
            BackendKind::PdfExtract => cfg!(feature = "pdf-extract"),
            #[cfg(feature = "pdfium")]
            BackendKind::Pdfium => pdfium::library_available(),
            #[cfg(not(feature = "pdfium"))]
            BackendKind::Pdfium => false,
        }
    }

    /// Build a backend of this kind over `source`. The document itself is
    /// not read until the backend is first used.
    pub fn open(self, source: Source) -> Result<Box<dyn Backend>> {
        match self {
            #[cfg(feature = "pdf-extract")]
            BackendKind::PdfExtract => Ok(Box::new(PdfExtractBackend::new(source))),
            #[cfg(feature = "pdfium")]
            BackendKind::Pdfium => Ok(Box::new(PdfiumBackend::new(source)?)),
            #[allow(unreachable_patterns)]
            kind => {
                drop(source);
                Err(PdfError::Configuration(format!(
                    "the `{}` feature is not enabled",
                    kind.name()
                )))
            }
        }
    }
}

impl FromStr for BackendKind {
    type Err = PdfError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| PdfError::unknown("PDF backend", name, &Self::names()))
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The preferred available engine: pdfium, then pdf-extract.
pub fn default_backend() -> Result<BackendKind> {
    [BackendKind::Pdfium, BackendKind::PdfExtract]
        .into_iter()
        .find(|kind| kind.is_available())
        .ok_or_else(|| {
            PdfError::Configuration(
                "install libpdfium (`pdfium` feature) or build with the `pdf-extract` feature"
                    .to_string(),
            )
        })
}

/// Open `source` with `kind`, or with [`default_backend`] when `None`.
pub fn open_backend(kind: Option<BackendKind>, source: impl Into<Source>) -> Result<Box<dyn Backend>> {
    let kind = match kind {
        Some(kind) => kind,
        None => default_backend()?,
    };
    debug!(backend = kind.name(), "opening document");
    kind.open(source.into())
}

/// Tracks the `starts_after` / `ends_before` region across pages.
///
/// The object matching `starts_after` is itself included. The object
/// matching `ends_before` is excluded and ends the whole document.
#[derive(Debug)]
pub struct PageWindow {
    starts_after: Option<ObjectMatcher>,
    ends_before: Option<ObjectMatcher>,
    started: bool,
    finished: bool,
}

impl PageWindow {
    pub fn new(starts_after: Option<ObjectMatcher>, ends_before: Option<ObjectMatcher>) -> Self {
        Self {
            started: starts_after.is_none(),
            starts_after,
            ends_before,
            finished: false,
        }
    }

    /// A window that keeps every object.
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Keep the objects of one page (already in reading order) that fall
    /// inside the window.
    pub fn apply(&mut self, objects: Vec<PageObject>) -> Vec<PageObject> {
        let mut kept = Vec::with_capacity(objects.len());
        if self.finished {
            return kept;
        }
        for obj in objects {
            if !self.started && self.starts_after.as_ref().is_some_and(|m| m.matches(&obj)) {
                self.started = true;
            }
            if self.started && self.ends_before.as_ref().is_some_and(|m| m.matches(&obj)) {
                self.finished = true;
                break;
            }
            if self.started {
                kept.push(obj);
            }
        }
        kept
    }
}

/// Sort a page's objects top-to-bottom, then left-to-right.
pub fn sort_reading_order(objects: &mut [PageObject], y_order: AxisOrder) {
    objects.sort_by(|a, b| reading_order(&a.bbox(), &b.bbox(), y_order));
}

/// Page indices of `pages` within the backend's document, with a warning
/// for every selected page the document does not have.
fn selected_indices(backend: &mut dyn Backend, pages: &PageSelection) -> Result<Vec<usize>> {
    let page_count = backend.page_count()?;
    if let PageSelection::Numbers(numbers) = pages {
        for missing in numbers.iter().filter(|&&n| n == 0 || n > page_count) {
            warn!(page = missing, page_count, "selected page is out of range");
        }
    }
    Ok(pages.indices(page_count))
}

/// Page indices resolved on first use, so that a document that cannot be
/// read fails on the first `next()` rather than at construction.
#[derive(Debug)]
enum PageCursor {
    Pending(PageSelection),
    Resolved(std::vec::IntoIter<usize>),
}

impl PageCursor {
    fn next_index(&mut self, backend: &mut dyn Backend) -> Option<Result<usize>> {
        if let PageCursor::Pending(pages) = self {
            match selected_indices(backend, pages) {
                Ok(indices) => *self = PageCursor::Resolved(indices.into_iter()),
                Err(err) => return Some(Err(err)),
            }
        }
        match self {
            PageCursor::Resolved(indices) => indices.next().map(Ok),
            PageCursor::Pending(_) => None,
        }
    }
}

/// Lazy per-page object lists for the selected pages of a backend.
///
/// Yields one (possibly empty) list per visited page and stops after the
/// page on which `ends_before` matched, or after the first error. The
/// backend is not touched until the first call to `next()`.
pub struct PageObjects {
    backend: Box<dyn Backend>,
    cursor: PageCursor,
    window: PageWindow,
    failed: bool,
}

impl PageObjects {
    pub fn new(backend: Box<dyn Backend>, pages: &PageSelection, window: PageWindow) -> Self {
        Self {
            backend,
            cursor: PageCursor::Pending(pages.clone()),
            window,
            failed: false,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl Iterator for PageObjects {
    type Item = Result<Vec<PageObject>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.window.is_finished() {
            return None;
        }
        let objects = self
            .cursor
            .next_index(self.backend.as_mut())?
            .and_then(|index| Ok((index, self.backend.all_objects(index)?)));
        let (index, mut objects) = match objects {
            Ok(found) => found,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };
        sort_reading_order(&mut objects, self.backend.y_order());
        let total = objects.len();
        let kept = self.window.apply(objects);
        debug!(
            page = index + 1,
            objects = total,
            kept = kept.len(),
            "read page objects"
        );
        Some(Ok(kept))
    }
}

/// Lazy plain text of the selected pages of a backend.
pub struct PageTexts {
    backend: Box<dyn Backend>,
    cursor: PageCursor,
    failed: bool,
}

impl PageTexts {
    pub fn new(backend: Box<dyn Backend>, pages: &PageSelection) -> Self {
        Self {
            backend,
            cursor: PageCursor::Pending(pages.clone()),
            failed: false,
        }
    }
}

impl Iterator for PageTexts {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let text = self
            .cursor
            .next_index(self.backend.as_mut())?
            .and_then(|index| self.backend.page_text(index));
        self.failed = text.is_err();
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RectObject;

    fn text(y0: f64, s: &str) -> PageObject {
        TextObject::new(0.0, y0, 10.0, y0 + 5.0, s).into()
    }

    fn texts(objects: &[PageObject]) -> Vec<&str> {
        objects
            .iter()
            .filter_map(PageObject::as_text)
            .map(|obj| obj.text.as_str())
            .collect()
    }

    #[test]
    fn unknown_backend_lists_options() {
        let err = "ghostscript".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, PdfError::UnknownIdentifier { .. }));
        let message = err.to_string();
        assert!(message.contains("ghostscript"));
        assert!(message.contains("pdf-extract"));
        assert!(message.contains("pdfium"));
    }

    #[test]
    fn window_includes_start_object_and_excludes_end_object() {
        let mut window = PageWindow::new(Some("Start".into()), Some("End".into()));
        let kept = window.apply(vec![
            text(0.0, "before"),
            text(10.0, " Start "),
            text(20.0, "row"),
            text(30.0, "End"),
            text(40.0, "after"),
        ]);
        assert_eq!(texts(&kept), vec![" Start ", "row"]);
        assert!(window.is_finished());
        assert!(window.apply(vec![text(0.0, "next page")]).is_empty());
    }

    #[test]
    fn window_stays_open_across_pages() {
        let mut window = PageWindow::new(Some("Start".into()), None);
        assert!(window.apply(vec![text(0.0, "cover")]).is_empty());
        assert!(!window.is_started());
        let kept = window.apply(vec![text(0.0, "Start"), text(10.0, "a")]);
        assert_eq!(texts(&kept), vec!["Start", "a"]);
        let kept = window.apply(vec![text(0.0, "b")]);
        assert_eq!(texts(&kept), vec!["b"]);
    }

    #[test]
    fn rects_never_match_text_matchers() {
        let mut window = PageWindow::new(None, Some("End".into()));
        let kept = window.apply(vec![
            RectObject::new(0.0, 0.0, 5.0, 5.0, true).into(),
            text(10.0, "End"),
        ]);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].as_rect().is_some());
    }

    #[test]
    fn page_objects_sort_into_reading_order_and_stop_at_end() {
        let backend = MemoryBackend::new(
            vec![
                vec![text(50.0, "low"), text(90.0, "high")],
                vec![text(90.0, "stop"), text(50.0, "hidden")],
                vec![text(90.0, "never")],
            ],
            AxisOrder::Descending,
        );
        let pages: Vec<Vec<PageObject>> = PageObjects::new(
            Box::new(backend),
            &PageSelection::All,
            PageWindow::new(None, Some("stop".into())),
        )
        .collect::<Result<_>>()
        .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(texts(&pages[0]), vec!["high", "low"]);
        assert!(pages[1].is_empty());
    }

    #[test]
    fn page_texts_follow_selection() {
        let backend = MemoryBackend::new(
            vec![vec![text(0.0, "one")], vec![text(0.0, "two")], vec![text(0.0, "three")]],
            AxisOrder::Ascending,
        );
        let selection: PageSelection = "1,3".parse().unwrap();
        let pages: Vec<String> = PageTexts::new(Box::new(backend), &selection)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(pages, vec!["one", "three"]);
    }

    #[test]
    fn missing_file_is_a_resource_error() {
        let source = Source::from("/nonexistent/path/to/file.pdf");
        assert!(matches!(source.bytes(), Err(PdfError::Resource(_))));
    }
}
