//! Backend over the pdfium engine via `pdfium-render`.
//!
//! One text object is produced per pdfium text segment. Coordinates are
//! converted to a top-left origin, so y grows downward. Each object carries
//! one [`TextStyle`] per run of equally styled characters. No rectangles
//! are reported.

use pdfium_render::prelude::*;
use tracing::debug;

use crate::error::{PdfError, Result};
use crate::geometry::{AxisOrder, PageObject, TextObject, TextStyle, style_runs};

use super::{Backend, Source};

fn bind() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|err| PdfError::Configuration(format!("cannot bind libpdfium: {err}")))?;
    Ok(Pdfium::new(bindings))
}

/// Whether libpdfium can be found next to the executable or on the system.
pub(super) fn library_available() -> bool {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .is_ok()
}

/// Styling of one character, flags laid out as [`TextStyle`] documents them.
fn char_style(ch: &PdfPageTextChar<'_>) -> TextStyle {
    let mut flags = 0;
    if ch.font_is_italic() {
        flags |= TextStyle::ITALIC;
    }
    if ch.font_is_serif() {
        flags |= TextStyle::SERIF;
    }
    if ch.font_is_fixed_pitch() {
        flags |= TextStyle::MONOSPACED;
    }
    if ch.font_is_bold_reenforced() {
        flags |= TextStyle::BOLD;
    }
    let color = ch.fill_color().ok().map(|color| {
        (u32::from(color.red()) << 16) | (u32::from(color.green()) << 8) | u32::from(color.blue())
    });
    let size = f64::from(ch.scaled_font_size().value);
    TextStyle {
        font: Some(ch.font_name()).filter(|name| !name.is_empty()),
        size: Some((size * 100.0).round() / 100.0),
        flags: Some(flags),
        color,
    }
}

/// One style run per change of styling within a segment.
fn segment_styles(segment: &PdfPageTextSegment<'_>) -> std::result::Result<Vec<TextStyle>, PdfiumError> {
    let chars = segment.chars()?;
    Ok(style_runs(
        chars
            .iter()
            .filter(|ch| ch.unicode_char().is_some_and(|c| !c.is_whitespace()))
            .map(|ch| char_style(&ch)),
    ))
}

fn resource_error(source: &Source, err: PdfiumError) -> PdfError {
    PdfError::Resource(format!("{source}: {err}"))
}

/// Backend driving pdfium. The library is bound at construction; the
/// document bytes are read on first use and parsed per call.
pub struct PdfiumBackend {
    pdfium: Pdfium,
    source: Source,
    bytes: Option<Vec<u8>>,
}

impl PdfiumBackend {
    pub const NAME: &'static str = "pdfium";

    pub fn new(source: Source) -> Result<Self> {
        Ok(Self {
            pdfium: bind()?,
            source,
            bytes: None,
        })
    }

    fn load_bytes(&mut self) -> Result<()> {
        if self.bytes.is_none() {
            self.bytes = Some(self.source.bytes()?.into_owned());
        }
        Ok(())
    }

    fn document(&mut self) -> Result<PdfDocument<'_>> {
        self.load_bytes()?;
        let bytes = self.bytes.as_deref().unwrap_or_default();
        self.pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|err| resource_error(&self.source, err))
    }

    fn with_page<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&PdfPage<'_>) -> std::result::Result<T, PdfiumError>,
    ) -> Result<T> {
        let document = self.document()?;
        let page = document
            .pages()
            .iter()
            .nth(index)
            .ok_or_else(|| PdfError::Resource(format!("page {} not found", index + 1)))?;
        f(&page).map_err(|err| PdfError::Resource(format!("page {}: {err}", index + 1)))
    }
}

impl Backend for PdfiumBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn y_order(&self) -> AxisOrder {
        AxisOrder::Ascending
    }

    fn page_count(&mut self) -> Result<usize> {
        Ok(self.document()?.pages().len() as usize)
    }

    fn page_text(&mut self, index: usize) -> Result<String> {
        self.with_page(index, |page| Ok(page.text()?.all()))
    }

    fn all_objects(&mut self, index: usize) -> Result<Vec<PageObject>> {
        let objects = self.with_page(index, |page| {
            let height = f64::from(page.height().value);
            let text = page.text()?;
            text.segments()
                .iter()
                .map(|segment| {
                    let bounds = segment.bounds();
                    let object = TextObject::new(
                        f64::from(bounds.left().value),
                        height - f64::from(bounds.top().value),
                        f64::from(bounds.right().value),
                        height - f64::from(bounds.bottom().value),
                        segment.text(),
                    )
                    .with_styles(segment_styles(&segment)?);
                    Ok(PageObject::from(object))
                })
                .collect::<std::result::Result<Vec<PageObject>, PdfiumError>>()
        })?;
        debug!(page = index + 1, segments = objects.len(), "read pdfium segments");
        Ok(objects)
    }
}
