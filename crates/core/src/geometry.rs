//! Positioned page objects and the geometric predicates used to group them.
//!
//! Coordinates are kept in the backend's native space: the y axis may grow
//! upward (PDF user space) or downward (top-left origin). Code that needs to
//! know "which way is the top" takes an [`AxisOrder`] instead of assuming one.

use std::cmp::Ordering;
use std::fmt;

/// One of the two geometric dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Direction in which reading order advances along an axis.
///
/// `Ascending` means smaller coordinates come first (left-to-right, or
/// top-to-bottom with a top-left origin); `Descending` is used for y when
/// the backend's origin sits at the bottom of the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AxisOrder {
    #[default]
    Ascending,
    Descending,
}

impl AxisOrder {
    /// Map a coordinate to a key that sorts in reading order.
    #[inline]
    pub fn key(self, value: f64) -> f64 {
        match self {
            AxisOrder::Ascending => value,
            AxisOrder::Descending => -value,
        }
    }

    pub fn is_reversed(self) -> bool {
        self == AxisOrder::Descending
    }
}

/// An axis-aligned bounding box `(x0, y0, x1, y1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// An inverted box that any `union` will replace.
    pub const EMPTY: BBox = BBox {
        x0: f64::INFINITY,
        y0: f64::INFINITY,
        x1: f64::NEG_INFINITY,
        y1: f64::NEG_INFINITY,
    };

    pub const ZERO: BBox = BBox::new(0.0, 0.0, 0.0, 0.0);

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// `(min, max)` extent along `axis`.
    pub fn span(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.x0, self.x1),
            Axis::Y => (self.y0, self.y1),
        }
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1
    }

    fn contains_point(&self, x: f64, y: f64) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}, {:.3}, {:.3}, {:.3}",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

/// Styling of one run inside a text object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyle {
    pub font: Option<String>,
    pub size: Option<f64>,
    pub flags: Option<u32>,
    pub color: Option<u32>,
}

impl TextStyle {
    /// Italic glyphs.
    pub const ITALIC: u32 = 1 << 1;
    /// Serifed font.
    pub const SERIF: u32 = 1 << 2;
    /// Fixed-pitch font.
    pub const MONOSPACED: u32 = 1 << 3;
    /// Bold glyphs.
    pub const BOLD: u32 = 1 << 4;

    pub fn is_bold(&self) -> bool {
        self.flags.is_some_and(|flags| flags & Self::BOLD != 0)
    }

    pub fn is_italic(&self) -> bool {
        self.flags.is_some_and(|flags| flags & Self::ITALIC != 0)
    }
}

/// Append `style` to `runs` unless it continues the last run.
pub fn push_style_run(runs: &mut Vec<TextStyle>, style: TextStyle) {
    if runs.last() != Some(&style) {
        runs.push(style);
    }
}

/// Collapse per-character styles into runs of equal styling.
pub fn style_runs(styles: impl IntoIterator<Item = TextStyle>) -> Vec<TextStyle> {
    let mut runs = Vec::new();
    for style in styles {
        push_style_run(&mut runs, style);
    }
    runs
}

/// A positioned fragment of text. The text is kept as the backend
/// produced it (not trimmed).
#[derive(Clone, Debug, PartialEq)]
pub struct TextObject {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub text: String,
    pub styles: Vec<TextStyle>,
}

impl TextObject {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, text: impl Into<String>) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            text: text.into(),
            styles: Vec::new(),
        }
    }

    pub fn with_styles(mut self, styles: Vec<TextStyle>) -> Self {
        self.styles = styles;
        self
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.y0, self.x1, self.y1)
    }
}

impl fmt::Display for TextObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.text.chars().count() > 50 {
            let head: String = self.text.chars().take(45).collect();
            format!("{head}[...]")
        } else {
            self.text.clone()
        };
        write!(f, "<TextObject ({}) {:?}>", self.bbox(), text)
    }
}

/// A rectangle drawn on the page. Only filled rectangles delimit cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectObject {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub fill: bool,
}

impl RectObject {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, fill: bool) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            fill,
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.y0, self.x1, self.y1)
    }
}

impl fmt::Display for RectObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<RectObject ({}) fill={}>", self.bbox(), self.fill)
    }
}

/// Anything a backend can place on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageObject {
    Text(TextObject),
    Rect(RectObject),
}

impl PageObject {
    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            PageObject::Text(text) => Some(text),
            PageObject::Rect(_) => None,
        }
    }

    pub fn as_rect(&self) -> Option<&RectObject> {
        match self {
            PageObject::Rect(rect) => Some(rect),
            PageObject::Text(_) => None,
        }
    }

    pub fn bbox(&self) -> BBox {
        match self {
            PageObject::Text(text) => text.bbox(),
            PageObject::Rect(rect) => rect.bbox(),
        }
    }
}

impl From<TextObject> for PageObject {
    fn from(obj: TextObject) -> Self {
        PageObject::Text(obj)
    }
}

impl From<RectObject> for PageObject {
    fn from(obj: RectObject) -> Self {
        PageObject::Rect(obj)
    }
}

impl fmt::Display for PageObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageObject::Text(text) => text.fmt(f),
            PageObject::Rect(rect) => rect.fmt(f),
        }
    }
}

/// Something with a bounding box that the grouping engine can cluster.
pub trait Positioned {
    fn bbox(&self) -> BBox;

    /// Number of characters, used to estimate character width on the x axis.
    fn char_count(&self) -> usize {
        0
    }
}

impl Positioned for TextObject {
    fn bbox(&self) -> BBox {
        TextObject::bbox(self)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl Positioned for RectObject {
    fn bbox(&self) -> BBox {
        RectObject::bbox(self)
    }
}

impl Positioned for PageObject {
    fn bbox(&self) -> BBox {
        PageObject::bbox(self)
    }

    fn char_count(&self) -> usize {
        self.as_text().map_or(0, Positioned::char_count)
    }
}

impl<T: Positioned + ?Sized> Positioned for &T {
    fn bbox(&self) -> BBox {
        (**self).bbox()
    }

    fn char_count(&self) -> usize {
        (**self).char_count()
    }
}

/// Whether the first range intercepts the second's threshold-expanded range.
#[inline]
pub fn intercepts(min1: f64, max1: f64, min2: f64, max2: f64, threshold: f64) -> bool {
    min1 < max2 + threshold && max1 > min2 - threshold
}

/// Whether the first range's center lies within the second's
/// threshold-expanded range.
#[inline]
pub fn contains_center(min1: f64, max1: f64, min2: f64, max2: f64, threshold: f64) -> bool {
    let center = min1 + (max1 - min1) / 2.0;
    min2 - threshold <= center && center <= max2 + threshold
}

/// Whether the first range lies fully within the second's
/// threshold-expanded range.
#[inline]
pub fn contains(min1: f64, max1: f64, min2: f64, max2: f64, threshold: f64) -> bool {
    min2 - threshold <= min1 && max1 <= max2 + threshold
}

/// `b` is inside `a`, or at least one corner of `b` is.
pub fn contains_or_overlap(a: &BBox, b: &BBox) -> bool {
    let inside = b.x0 >= a.x0 && b.x1 <= a.x1 && b.y0 >= a.y0 && b.y1 <= a.y1;
    inside
        || a.contains_point(b.x0, b.y0)
        || a.contains_point(b.x0, b.y1)
        || a.contains_point(b.x1, b.y0)
        || a.contains_point(b.x1, b.y1)
}

/// Euclidean distance between the `(x0, y0)` anchors of two boxes.
pub fn distance(a: &BBox, b: &BBox) -> f64 {
    ((a.x0 - b.x0).powi(2) + (a.y0 - b.y0).powi(2)).sqrt()
}

/// Compare two objects in reading order: top-to-bottom, then left-to-right.
pub fn reading_order(a: &BBox, b: &BBox, y_order: AxisOrder) -> Ordering {
    y_order
        .key(a.y0)
        .total_cmp(&y_order.key(b.y0))
        .then_with(|| a.x0.total_cmp(&b.x0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: BBox = BBox::new(0.0, 0.0, 10.0, 10.0);
    const B: BBox = BBox::new(5.0, 5.0, 15.0, 15.0);

    #[test]
    fn overlapping_boxes_intercept_but_are_not_contained() {
        assert!(intercepts(A.x0, A.x1, B.x0, B.x1, 0.0));
        assert!(intercepts(A.y0, A.y1, B.y0, B.y1, 0.0));
        assert!(!contains(B.x0, B.x1, A.x0, A.x1, 0.0));
        assert!(!contains(A.x0, A.x1, B.x0, B.x1, 0.0));
    }

    #[test]
    fn center_containment_depends_on_threshold() {
        // B's center is at 10: exactly on A's edge
        assert!(contains_center(B.x0, B.x1, A.x0, A.x1, 0.0));
        // A 9..11 range centered at 10 against 0..9.5
        assert!(!contains_center(9.0, 11.0, 0.0, 9.5, 0.0));
        assert!(contains_center(9.0, 11.0, 0.0, 9.5, 0.5));
    }

    #[test]
    fn touching_ranges_only_intercept_with_threshold() {
        assert!(!intercepts(0.0, 10.0, 10.0, 20.0, 0.0));
        assert!(intercepts(0.0, 10.0, 10.0, 20.0, 0.1));
    }

    #[test]
    fn contains_or_overlap_checks_corners() {
        assert!(contains_or_overlap(&A, &B));
        assert!(contains_or_overlap(&A, &BBox::new(2.0, 2.0, 3.0, 3.0)));
        assert!(!contains_or_overlap(&A, &BBox::new(11.0, 0.0, 12.0, 1.0)));
        // crossing without any corner inside is not an overlap
        assert!(!contains_or_overlap(&A, &BBox::new(-1.0, 4.0, 11.0, 6.0)));
    }

    #[test]
    fn distance_uses_anchor_points() {
        assert_eq!(distance(&A, &BBox::new(3.0, 4.0, 100.0, 100.0)), 5.0);
    }

    #[test]
    fn text_object_display_shortens_long_text() {
        let obj = TextObject::new(0.0, 0.0, 1.0, 1.0, "x".repeat(60));
        let shown = obj.to_string();
        assert!(shown.starts_with("<TextObject (0.000, 0.000, 1.000, 1.000) \""));
        assert!(shown.ends_with("[...]\">"));
    }

    #[test]
    fn reading_order_respects_y_direction() {
        let top_left = BBox::new(0.0, 90.0, 5.0, 95.0);
        let bottom = BBox::new(0.0, 10.0, 5.0, 15.0);
        assert_eq!(
            reading_order(&top_left, &bottom, AxisOrder::Descending),
            Ordering::Less
        );
        assert_eq!(
            reading_order(&top_left, &bottom, AxisOrder::Ascending),
            Ordering::Greater
        );
    }

    #[test]
    fn style_runs_merge_consecutive_equal_styles() {
        let body = TextStyle {
            font: Some("Helvetica".into()),
            size: Some(10.0),
            ..TextStyle::default()
        };
        let bold = TextStyle {
            flags: Some(TextStyle::BOLD),
            ..body.clone()
        };
        let runs = style_runs([body.clone(), body.clone(), bold.clone(), body.clone()]);
        assert_eq!(runs, vec![body.clone(), bold.clone(), body]);
        assert!(runs[1].is_bold());
        assert!(!runs[1].is_italic());
        assert!(style_runs([]).is_empty());
    }
}
