//! Cell boundaries taken from filled rectangles.

use itertools::Itertools;
use once_cell::unsync::OnceCell;
use ordered_float::OrderedFloat;

use super::{AlgorithmInput, ExtractionAlgorithm, Interval, Selection};
use crate::error::{PdfError, Result};
use crate::geometry::{Axis, BBox, RectObject, TextObject};

/// Ignores text layout: the table is the envelope of the filled rectangles
/// and each distinct rectangle edge pair is a row or column.
#[derive(Debug)]
pub struct RectsBoundaries {
    input: AlgorithmInput,
    rects: Vec<RectObject>,
    bbox: OnceCell<BBox>,
    selection: Selection,
    x_intervals: OnceCell<Vec<Interval>>,
    y_intervals: OnceCell<Vec<Interval>>,
}

impl RectsBoundaries {
    pub const NAME: &'static str = "rects-boundaries";

    pub fn new(input: AlgorithmInput) -> Self {
        let rects = input
            .objects
            .iter()
            .filter_map(|obj| obj.as_rect())
            .filter(|rect| rect.fill)
            .copied()
            .collect();
        Self {
            input,
            rects,
            bbox: OnceCell::new(),
            selection: Selection::default(),
            x_intervals: OnceCell::new(),
            y_intervals: OnceCell::new(),
        }
    }

    /// Filled rectangles the boundaries are derived from.
    pub fn rects(&self) -> &[RectObject] {
        &self.rects
    }

    fn intervals(&self, axis: Axis) -> Vec<Interval> {
        let distinct: Vec<Interval> = self
            .rects
            .iter()
            .map(|rect| {
                let (min, max) = rect.bbox().span(axis);
                (OrderedFloat(min), OrderedFloat(max))
            })
            .sorted()
            .dedup()
            .map(|(min, max)| (min.into_inner(), max.into_inner()))
            .collect();
        remove_nested(&distinct)
    }
}

/// Drop every interval lying inside another, different interval.
///
/// Rectangles drawn both as cells and as row or column bands produce
/// such nested spans.
fn remove_nested(intervals: &[Interval]) -> Vec<Interval> {
    intervals
        .iter()
        .filter(|&&interval| {
            !intervals
                .iter()
                .any(|&other| other != interval && interval.0 >= other.0 && interval.1 <= other.1)
        })
        .copied()
        .collect()
}

impl ExtractionAlgorithm for RectsBoundaries {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn input(&self) -> &AlgorithmInput {
        &self.input
    }

    fn table_bbox(&self) -> Result<BBox> {
        self.bbox
            .get_or_try_init(|| {
                if self.rects.is_empty() {
                    return Err(PdfError::NoFilledRects);
                }
                Ok(self
                    .rects
                    .iter()
                    .fold(BBox::EMPTY, |acc, rect| acc.union(&rect.bbox())))
            })
            .copied()
    }

    fn x_intervals(&self) -> Result<Vec<Interval>> {
        Ok(self
            .x_intervals
            .get_or_init(|| self.intervals(Axis::X))
            .clone())
    }

    fn y_intervals(&self) -> Result<Vec<Interval>> {
        Ok(self
            .y_intervals
            .get_or_init(|| self.intervals(Axis::Y))
            .clone())
    }

    fn selected_objects(&self) -> Result<Vec<&TextObject>> {
        self.selection.get(&self.input, || self.table_bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AxisOrder, PageObject};

    fn build(objects: Vec<PageObject>) -> RectsBoundaries {
        RectsBoundaries::new(AlgorithmInput::new(
            objects,
            None,
            None,
            AxisOrder::Ascending,
            AxisOrder::Ascending,
        ))
    }

    #[test]
    fn nested_intervals_are_removed() {
        assert_eq!(
            remove_nested(&[(0.0, 100.0), (0.0, 50.0), (50.0, 100.0), (120.0, 130.0)]),
            vec![(0.0, 100.0), (120.0, 130.0)]
        );
        assert_eq!(
            remove_nested(&[(0.0, 50.0), (40.0, 100.0)]),
            vec![(0.0, 50.0), (40.0, 100.0)]
        );
    }

    #[test]
    fn unfilled_rects_are_ignored() {
        let alg = build(vec![
            RectObject::new(0.0, 0.0, 10.0, 10.0, false).into(),
            TextObject::new(1.0, 1.0, 5.0, 5.0, "a").into(),
        ]);
        assert!(alg.rects().is_empty());
        assert!(matches!(alg.table_bbox(), Err(PdfError::NoFilledRects)));
        assert!(matches!(alg.lines(), Err(PdfError::NoFilledRects)));
    }

    #[test]
    fn cells_follow_cell_rectangles() {
        let alg = build(vec![
            RectObject::new(0.0, 0.0, 50.0, 20.0, true).into(),
            RectObject::new(50.0, 0.0, 100.0, 20.0, true).into(),
            RectObject::new(0.0, 20.0, 50.0, 40.0, true).into(),
            RectObject::new(50.0, 20.0, 100.0, 40.0, true).into(),
            TextObject::new(5.0, 5.0, 20.0, 15.0, "a").into(),
            TextObject::new(55.0, 5.0, 70.0, 15.0, "b").into(),
            TextObject::new(5.0, 25.0, 20.0, 35.0, "c").into(),
            TextObject::new(200.0, 25.0, 220.0, 35.0, "outside").into(),
        ]);
        assert_eq!(alg.table_bbox().unwrap(), BBox::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(alg.x_intervals().unwrap(), vec![(0.0, 50.0), (50.0, 100.0)]);
        assert_eq!(alg.y_intervals().unwrap(), vec![(0.0, 20.0), (20.0, 40.0)]);
        assert_eq!(alg.selected_objects().unwrap().len(), 3);
        let lines = alg.lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].as_ref().unwrap()[0].text, "a");
        assert_eq!(lines[0][1].as_ref().unwrap()[0].text, "b");
        assert_eq!(lines[1][0].as_ref().unwrap()[0].text, "c");
        assert!(lines[1][1].is_none());
    }

    #[test]
    fn divider_rectangles_collapse_into_outer_box() {
        let alg = build(vec![
            RectObject::new(0.0, 0.0, 100.0, 40.0, true).into(),
            RectObject::new(0.0, 19.0, 100.0, 21.0, true).into(),
            RectObject::new(49.0, 0.0, 51.0, 40.0, true).into(),
        ]);
        for intervals in [alg.x_intervals().unwrap(), alg.y_intervals().unwrap()] {
            for (i, a) in intervals.iter().enumerate() {
                for (j, b) in intervals.iter().enumerate() {
                    assert!(i == j || !(a.0 >= b.0 && a.1 <= b.1), "{a:?} nested in {b:?}");
                }
            }
        }
        assert_eq!(alg.x_intervals().unwrap(), vec![(0.0, 100.0)]);
        assert_eq!(alg.y_intervals().unwrap(), vec![(0.0, 40.0)]);
    }
}
