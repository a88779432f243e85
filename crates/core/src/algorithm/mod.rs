//! Table extraction algorithms.
//!
//! An algorithm is built for exactly one page. It decides where the table
//! is (`table_bbox`), which row and column intervals it has, and finally
//! assigns every selected text object to one cell of a row-major matrix.

mod header_position;
mod rects_boundaries;
mod y_groups;

use std::fmt;
use std::str::FromStr;

use once_cell::unsync::OnceCell;

use crate::error::{PdfError, Result};
use crate::geometry::{AxisOrder, BBox, PageObject, TextObject, contains_or_overlap};

pub use header_position::HeaderPosition;
pub use rects_boundaries::RectsBoundaries;
pub use y_groups::YGroups;

/// A `(min, max)` span of one row or column.
pub type Interval = (f64, f64);

/// Objects assigned to one cell; `None` marks an intersection nothing fell into.
pub type Cell<'a> = Option<Vec<&'a TextObject>>;

/// One row of cells.
pub type Line<'a> = Vec<Cell<'a>>;

/// Everything an algorithm needs to know about a page.
#[derive(Clone, Debug)]
pub struct AlgorithmInput {
    pub objects: Vec<PageObject>,
    pub text_objects: Vec<TextObject>,
    pub x_threshold: Option<f64>,
    pub y_threshold: Option<f64>,
    pub x_order: AxisOrder,
    pub y_order: AxisOrder,
}

impl AlgorithmInput {
    /// Build the input from a page's objects; text objects are split out.
    pub fn new(
        objects: Vec<PageObject>,
        x_threshold: Option<f64>,
        y_threshold: Option<f64>,
        x_order: AxisOrder,
        y_order: AxisOrder,
    ) -> Self {
        let text_objects = objects
            .iter()
            .filter_map(PageObject::as_text)
            .cloned()
            .collect();
        Self {
            objects,
            text_objects,
            x_threshold,
            y_threshold,
            x_order,
            y_order,
        }
    }
}

/// A strategy turning one page's objects into a matrix of cells.
pub trait ExtractionAlgorithm {
    fn name(&self) -> &'static str;

    fn input(&self) -> &AlgorithmInput;

    /// Bounding rectangle of the detected table.
    fn table_bbox(&self) -> Result<BBox>;

    /// Column boundaries, ascending.
    fn x_intervals(&self) -> Result<Vec<Interval>>;

    /// Row boundaries, ascending.
    fn y_intervals(&self) -> Result<Vec<Interval>>;

    /// Text objects inside or overlapping the table bbox.
    fn selected_objects(&self) -> Result<Vec<&TextObject>>;

    /// Row-major cell matrix in reading order.
    fn lines(&self) -> Result<Vec<Line<'_>>> {
        let input = self.input();
        Ok(assign_cells(
            self.selected_objects()?,
            self.x_intervals()?,
            self.y_intervals()?,
            input.x_order,
            input.y_order,
        ))
    }
}

/// Memoised indices of the text objects that survive the bbox filter.
#[derive(Debug, Default)]
pub(crate) struct Selection(OnceCell<Vec<usize>>);

impl Selection {
    pub(crate) fn get<'a>(
        &self,
        input: &'a AlgorithmInput,
        table_bbox: impl FnOnce() -> Result<BBox>,
    ) -> Result<Vec<&'a TextObject>> {
        let indices = self.0.get_or_try_init(|| {
            let bbox = table_bbox()?;
            Ok::<_, PdfError>(
                input
                    .text_objects
                    .iter()
                    .enumerate()
                    .filter(|(_, obj)| contains_or_overlap(&bbox, &obj.bbox()))
                    .map(|(index, _)| index)
                    .collect(),
            )
        })?;
        Ok(indices.iter().map(|&i| &input.text_objects[i]).collect())
    }
}

/// Place objects into the cells formed by crossing row and column intervals.
///
/// Intervals are visited in reading order (reversed when the axis order is
/// descending). An object belongs to the first cell whose intervals contain
/// its `(x0, y0)` anchor; once claimed it is not considered again.
pub fn assign_cells<'a>(
    objects: Vec<&'a TextObject>,
    mut x_intervals: Vec<Interval>,
    mut y_intervals: Vec<Interval>,
    x_order: AxisOrder,
    y_order: AxisOrder,
) -> Vec<Line<'a>> {
    if x_order.is_reversed() {
        x_intervals.reverse();
    }
    if y_order.is_reversed() {
        y_intervals.reverse();
    }

    let mut claimed = vec![false; objects.len()];
    let mut matrix = Vec::with_capacity(y_intervals.len());
    for &(y0, y1) in &y_intervals {
        let mut line = Vec::with_capacity(x_intervals.len());
        for &(x0, x1) in &x_intervals {
            let members: Vec<usize> = objects
                .iter()
                .enumerate()
                .filter(|&(i, obj)| {
                    !claimed[i] && x0 <= obj.x0 && obj.x0 <= x1 && y0 <= obj.y0 && obj.y0 <= y1
                })
                .map(|(i, _)| i)
                .collect();
            if members.is_empty() {
                line.push(None);
            } else {
                for &i in &members {
                    claimed[i] = true;
                }
                line.push(Some(members.into_iter().map(|i| objects[i]).collect()));
            }
        }
        matrix.push(line);
    }
    matrix
}

/// The built-in algorithms, addressable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    YGroups,
    HeaderPosition,
    RectsBoundaries,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::YGroups,
        Algorithm::HeaderPosition,
        Algorithm::RectsBoundaries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::YGroups => YGroups::NAME,
            Algorithm::HeaderPosition => HeaderPosition::NAME,
            Algorithm::RectsBoundaries => RectsBoundaries::NAME,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|algorithm| algorithm.name()).collect()
    }

    pub fn build(self, input: AlgorithmInput) -> Box<dyn ExtractionAlgorithm> {
        match self {
            Algorithm::YGroups => Box::new(YGroups::new(input)),
            Algorithm::HeaderPosition => Box::new(HeaderPosition::new(input)),
            Algorithm::RectsBoundaries => Box::new(RectsBoundaries::new(input)),
        }
    }
}

impl FromStr for Algorithm {
    type Err = PdfError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name)
            .ok_or_else(|| PdfError::unknown("algorithm", name, &Self::names()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Constructor for a caller-provided algorithm.
pub type AlgorithmFactory = fn(AlgorithmInput) -> Box<dyn ExtractionAlgorithm>;

/// A built-in algorithm or a caller's own implementation, which bypasses
/// the name registry.
#[derive(Clone, Copy)]
pub enum AlgorithmChoice {
    Builtin(Algorithm),
    Custom {
        name: &'static str,
        build: AlgorithmFactory,
    },
}

impl AlgorithmChoice {
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmChoice::Builtin(algorithm) => algorithm.name(),
            AlgorithmChoice::Custom { name, .. } => *name,
        }
    }

    pub fn build(&self, input: AlgorithmInput) -> Box<dyn ExtractionAlgorithm> {
        match self {
            AlgorithmChoice::Builtin(algorithm) => algorithm.build(input),
            AlgorithmChoice::Custom { build, .. } => build(input),
        }
    }
}

impl Default for AlgorithmChoice {
    fn default() -> Self {
        AlgorithmChoice::Builtin(Algorithm::default())
    }
}

impl fmt::Debug for AlgorithmChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmChoice::Builtin(algorithm) => f.debug_tuple("Builtin").field(algorithm).finish(),
            AlgorithmChoice::Custom { name, .. } => {
                f.debug_struct("Custom").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

impl From<Algorithm> for AlgorithmChoice {
    fn from(algorithm: Algorithm) -> Self {
        AlgorithmChoice::Builtin(algorithm)
    }
}

impl FromStr for AlgorithmChoice {
    type Err = PdfError;

    fn from_str(name: &str) -> Result<Self> {
        name.parse().map(AlgorithmChoice::Builtin)
    }
}
