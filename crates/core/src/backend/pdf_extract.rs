//! Backend over the `pdf-extract` content-stream interpreter.
//!
//! `pdf-extract` reports one glyph at a time through [`OutputDev`]. Glyphs
//! are assembled into line-level text objects here; filled and stroked
//! rectangular paths become [`RectObject`]s. Coordinates stay in PDF user
//! space, so y grows upward.

use once_cell::unsync::OnceCell;
use pdf_extract::{
    ColorSpace, Document, MediaBox, OutputDev, OutputError, Path, PathOp, Transform,
    output_doc_page,
};
use tracing::{debug, warn};

use crate::error::{PdfError, Result};
use crate::geometry::{
    AxisOrder, BBox, PageObject, RectObject, TextObject, TextStyle, push_style_run,
};

use super::{Backend, Source, sort_reading_order};

/// Tolerance for treating path coordinates as equal.
const EPSILON: f64 = 1e-6;

/// How glyphs are grouped into lines and words.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Two glyphs are on the same line when their vertical overlap exceeds
    /// this fraction of the smaller glyph height.
    pub line_overlap: f64,

    /// Two glyphs on the same line belong to the same text object when the
    /// gap between them is below this multiple of the wider glyph.
    pub char_margin: f64,

    /// A gap wider than this multiple of the glyph width starts a new word.
    pub word_margin: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            char_margin: 2.0,
            word_margin: 0.1,
        }
    }
}

/// A positioned glyph in user space.
#[derive(Debug, Clone)]
struct Glyph {
    bbox: BBox,
    text: String,
    /// Rendered size in user space, rounded to hundredths.
    size: f64,
}

impl Glyph {
    fn style(&self) -> TextStyle {
        TextStyle {
            size: Some(self.size),
            ..TextStyle::default()
        }
    }
}

/// Gap between two boxes along x, 0 when they overlap.
fn hdistance(a: &BBox, b: &BBox) -> f64 {
    if a.x1 < b.x0 {
        b.x0 - a.x1
    } else if b.x1 < a.x0 {
        a.x0 - b.x1
    } else {
        0.0
    }
}

fn voverlap(a: &BBox, b: &BBox) -> f64 {
    a.y1.min(b.y1) - a.y0.max(b.y0)
}

/// A text line being assembled from consecutive glyphs.
#[derive(Debug)]
struct LineBuilder {
    bbox: BBox,
    last: BBox,
    text: String,
    styles: Vec<TextStyle>,
    pending_space: bool,
}

impl LineBuilder {
    fn new(glyph: Glyph) -> Self {
        Self {
            bbox: glyph.bbox,
            last: glyph.bbox,
            styles: vec![glyph.style()],
            text: glyph.text,
            pending_space: false,
        }
    }

    fn accepts(&self, glyph: &Glyph, params: &LayoutParams) -> bool {
        let min_height = self.last.height().min(glyph.bbox.height());
        let mut width = self.last.width().max(glyph.bbox.width());
        if width <= 0.0 {
            width = self.last.height().max(glyph.bbox.height());
        }
        voverlap(&self.last, &glyph.bbox) > min_height * params.line_overlap
            && hdistance(&self.last, &glyph.bbox) < width * params.char_margin
    }

    fn push(&mut self, glyph: Glyph, params: &LayoutParams) {
        let gap = glyph.bbox.x0 - self.last.x1;
        let width = self.last.width().max(glyph.bbox.width());
        let word_break = self.pending_space || gap > width * params.word_margin;
        if word_break && !self.text.ends_with(' ') {
            self.text.push(' ');
        }
        push_style_run(&mut self.styles, glyph.style());
        self.text.push_str(&glyph.text);
        self.bbox = self.bbox.union(&glyph.bbox);
        self.last = glyph.bbox;
        self.pending_space = false;
    }

    fn finish(self) -> TextObject {
        TextObject::new(
            self.bbox.x0,
            self.bbox.y0,
            self.bbox.x1,
            self.bbox.y1,
            self.text.trim_end(),
        )
        .with_styles(self.styles)
    }
}

fn transform_point(m: &Transform, x: f64, y: f64) -> (f64, f64) {
    (m.m11 * x + m.m21 * y + m.m31, m.m12 * x + m.m22 * y + m.m32)
}

fn bbox_of(points: &[(f64, f64)]) -> BBox {
    points.iter().fold(BBox::EMPTY, |acc, &(x, y)| {
        acc.union(&BBox::new(x, y, x, y))
    })
}

/// A closed four-corner subpath with axis-aligned edges.
fn axis_aligned_rect(points: &[(f64, f64)]) -> Option<BBox> {
    let corners = match points {
        [a, b, c, d, e] if (a.0 - e.0).abs() < EPSILON && (a.1 - e.1).abs() < EPSILON => {
            [*a, *b, *c, *d]
        }
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return None,
    };
    let aligned = (0..4).all(|i| {
        let (p, q) = (corners[i], corners[(i + 1) % 4]);
        (p.0 - q.0).abs() < EPSILON || (p.1 - q.1).abs() < EPSILON
    });
    let bbox = bbox_of(&corners);
    (aligned && !bbox.is_empty()).then_some(bbox)
}

/// Rectangles drawn by `path` once mapped through `ctm`.
fn path_rects(ctm: &Transform, path: &Path) -> Vec<BBox> {
    let mut rects = Vec::new();
    let mut subpath: Vec<(f64, f64)> = Vec::new();
    let mut curved = false;

    let close = |subpath: &mut Vec<(f64, f64)>, curved: &mut bool, rects: &mut Vec<BBox>| {
        if !*curved {
            rects.extend(axis_aligned_rect(subpath));
        }
        subpath.clear();
        *curved = false;
    };

    for op in &path.ops {
        match *op {
            PathOp::Rect(x, y, width, height) => {
                close(&mut subpath, &mut curved, &mut rects);
                let corners = [
                    transform_point(ctm, x, y),
                    transform_point(ctm, x + width, y),
                    transform_point(ctm, x + width, y + height),
                    transform_point(ctm, x, y + height),
                ];
                if let Some(bbox) = axis_aligned_rect(&corners) {
                    rects.push(bbox);
                }
            }
            PathOp::MoveTo(x, y) => {
                close(&mut subpath, &mut curved, &mut rects);
                subpath.push(transform_point(ctm, x, y));
            }
            PathOp::LineTo(x, y) => subpath.push(transform_point(ctm, x, y)),
            PathOp::CurveTo(..) => curved = true,
            PathOp::Close => close(&mut subpath, &mut curved, &mut rects),
        }
    }
    close(&mut subpath, &mut curved, &mut rects);
    rects
}

/// Collects the objects of a single page.
struct PageCollector<'p> {
    params: &'p LayoutParams,
    current: Option<LineBuilder>,
    objects: Vec<PageObject>,
}

impl<'p> PageCollector<'p> {
    fn new(params: &'p LayoutParams) -> Self {
        Self {
            params,
            current: None,
            objects: Vec::new(),
        }
    }

    fn push_glyph(&mut self, glyph: Glyph) {
        match self.current.as_mut() {
            Some(line) if line.accepts(&glyph, self.params) => line.push(glyph, self.params),
            _ => {
                self.flush_line();
                self.current = Some(LineBuilder::new(glyph));
            }
        }
    }

    fn flush_line(&mut self) {
        if let Some(line) = self.current.take() {
            let obj = line.finish();
            if !obj.text.is_empty() {
                self.objects.push(obj.into());
            }
        }
    }

    fn push_rects(&mut self, ctm: &Transform, path: &Path, fill: bool) {
        for bbox in path_rects(ctm, path) {
            self.objects
                .push(RectObject::new(bbox.x0, bbox.y0, bbox.x1, bbox.y1, fill).into());
        }
    }

    fn finish(mut self) -> Vec<PageObject> {
        self.flush_line();
        self.objects
    }
}

impl OutputDev for PageCollector<'_> {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_line();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if char.trim().is_empty() {
            if let Some(line) = self.current.as_mut() {
                line.pending_space = true;
            }
            return Ok(());
        }
        let sx = font_size * (trm.m11 + trm.m21);
        let sy = font_size * (trm.m12 + trm.m22);
        let size = (sx * sy).abs().sqrt();
        let (x, y) = (trm.m31, trm.m32);
        self.push_glyph(Glyph {
            bbox: BBox::new(x, y, x + width * size, y + size),
            text: char.to_string(),
            size: (size * 100.0).round() / 100.0,
        });
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn stroke(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &Path,
    ) -> std::result::Result<(), OutputError> {
        self.push_rects(ctm, path, false);
        Ok(())
    }

    fn fill(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &Path,
    ) -> std::result::Result<(), OutputError> {
        self.push_rects(ctm, path, true);
        Ok(())
    }
}

/// Backend driving `pdf-extract`; the document is parsed on first use.
pub struct PdfExtractBackend {
    source: Source,
    params: LayoutParams,
    document: OnceCell<Document>,
}

impl PdfExtractBackend {
    pub const NAME: &'static str = "pdf-extract";

    pub fn new(source: Source) -> Self {
        Self {
            source,
            params: LayoutParams::default(),
            document: OnceCell::new(),
        }
    }

    pub fn with_params(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document.get_or_try_init(|| {
            let bytes = self.source.bytes()?;
            let document = Document::load_mem(&bytes)
                .map_err(|err| PdfError::Resource(format!("{}: {err}", self.source)))?;
            if document.is_encrypted() {
                warn!(source = %self.source, "document is encrypted; text may be unreadable");
            }
            debug!(source = %self.source, pages = document.get_pages().len(), "loaded document");
            Ok(document)
        })
    }

    fn page_objects(&self, index: usize) -> Result<Vec<PageObject>> {
        let document = self.document()?;
        let page_number = document
            .get_pages()
            .keys()
            .nth(index)
            .copied()
            .ok_or_else(|| PdfError::Resource(format!("page {} not found", index + 1)))?;
        let mut collector = PageCollector::new(&self.params);
        output_doc_page(document, &mut collector, page_number)
            .map_err(|err| PdfError::Resource(format!("page {}: {err:?}", index + 1)))?;
        Ok(collector.finish())
    }
}

impl Backend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn y_order(&self) -> AxisOrder {
        AxisOrder::Descending
    }

    fn page_count(&mut self) -> Result<usize> {
        Ok(self.document()?.get_pages().len())
    }

    fn page_text(&mut self, index: usize) -> Result<String> {
        let mut objects = self.page_objects(index)?;
        sort_reading_order(&mut objects, AxisOrder::Descending);
        let lines: Vec<&str> = objects
            .iter()
            .filter_map(PageObject::as_text)
            .map(|obj| obj.text.as_str())
            .collect();
        Ok(lines.join("\n"))
    }

    fn all_objects(&mut self, index: usize) -> Result<Vec<PageObject>> {
        self.page_objects(index)
    }
}
