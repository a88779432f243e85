//! Default strategy: rows and columns come from grouping text objects.

use once_cell::unsync::OnceCell;
use tracing::trace;

use super::{AlgorithmInput, ExtractionAlgorithm, Interval, Selection};
use crate::error::Result;
use crate::geometry::{Axis, BBox, Positioned, TextObject};
use crate::grouping::{DEFAULT_THRESHOLD_PROPORTION, define_threshold, group_objects};

/// Finds the table as the envelope of every y-group holding at least two
/// objects, then derives rows and columns by grouping the objects inside it.
#[derive(Debug)]
pub struct YGroups {
    input: AlgorithmInput,
    bbox: OnceCell<BBox>,
    selection: Selection,
    x_intervals: OnceCell<Vec<Interval>>,
    y_intervals: OnceCell<Vec<Interval>>,
}

impl YGroups {
    pub const NAME: &'static str = "y-groups";

    pub fn new(input: AlgorithmInput) -> Self {
        Self {
            input,
            bbox: OnceCell::new(),
            selection: Selection::default(),
            x_intervals: OnceCell::new(),
            y_intervals: OnceCell::new(),
        }
    }

    fn compute_bbox(&self) -> BBox {
        let bbox = group_objects(Axis::Y, &self.input.text_objects, self.input.y_threshold)
            .iter()
            // a lone object on its line is floating text, not a table row
            .filter(|group| group.len() >= 2)
            .fold(BBox::EMPTY, |acc, group| acc.union(&group.bbox()));
        if bbox.is_empty() { BBox::ZERO } else { bbox }
    }

    fn intervals(&self, axis: Axis) -> Result<Vec<Interval>> {
        let objects = self.selected_objects()?;
        let threshold = match axis {
            Axis::X => self.input.x_threshold,
            Axis::Y => self.input.y_threshold,
        }
        .unwrap_or_else(|| define_threshold(axis, &objects, DEFAULT_THRESHOLD_PROPORTION));
        Ok(group_objects(axis, &objects, Some(threshold))
            .iter()
            .map(|group| group.interval(axis))
            .collect())
    }
}

impl ExtractionAlgorithm for YGroups {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn input(&self) -> &AlgorithmInput {
        &self.input
    }

    fn table_bbox(&self) -> Result<BBox> {
        let bbox = *self.bbox.get_or_init(|| self.compute_bbox());
        trace!(%bbox, "y-groups table bbox");
        Ok(bbox)
    }

    fn x_intervals(&self) -> Result<Vec<Interval>> {
        self.x_intervals
            .get_or_try_init(|| self.intervals(Axis::X))
            .cloned()
    }

    fn y_intervals(&self) -> Result<Vec<Interval>> {
        self.y_intervals
            .get_or_try_init(|| self.intervals(Axis::Y))
            .cloned()
    }

    fn selected_objects(&self) -> Result<Vec<&TextObject>> {
        self.selection.get(&self.input, || self.table_bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AxisOrder, PageObject};

    fn input(objects: Vec<TextObject>) -> AlgorithmInput {
        AlgorithmInput::new(
            objects.into_iter().map(PageObject::from).collect(),
            Some(0.5),
            Some(0.5),
            AxisOrder::Ascending,
            AxisOrder::Ascending,
        )
    }

    #[test]
    fn floating_text_is_outside_table_bbox() {
        let algorithm = YGroups::new(input(vec![
            TextObject::new(0.0, 0.0, 80.0, 10.0, "Report title"),
            TextObject::new(0.0, 30.0, 20.0, 40.0, "a"),
            TextObject::new(50.0, 30.0, 70.0, 40.0, "b"),
            TextObject::new(0.0, 50.0, 20.0, 60.0, "1"),
            TextObject::new(50.0, 50.0, 70.0, 60.0, "2"),
        ]));
        assert_eq!(
            algorithm.table_bbox().unwrap(),
            BBox::new(0.0, 30.0, 70.0, 60.0)
        );
        let selected: Vec<&str> = algorithm
            .selected_objects()
            .unwrap()
            .iter()
            .map(|obj| obj.text.as_str())
            .collect();
        assert_eq!(selected, vec!["a", "b", "1", "2"]);
    }

    #[test]
    fn page_without_rows_has_zero_bbox() {
        let algorithm = YGroups::new(input(vec![TextObject::new(
            10.0, 10.0, 20.0, 20.0, "alone",
        )]));
        assert_eq!(algorithm.table_bbox().unwrap(), BBox::ZERO);
        assert!(algorithm.lines().unwrap().is_empty());
    }

    #[test]
    fn intervals_follow_groups() {
        let algorithm = YGroups::new(input(vec![
            TextObject::new(0.0, 0.0, 20.0, 10.0, "a"),
            TextObject::new(50.0, 1.0, 70.0, 11.0, "b"),
            TextObject::new(0.0, 20.0, 22.0, 30.0, "c"),
            TextObject::new(48.0, 20.0, 70.0, 30.0, "d"),
        ]));
        assert_eq!(
            algorithm.y_intervals().unwrap(),
            vec![(0.0, 11.0), (20.0, 30.0)]
        );
        assert_eq!(
            algorithm.x_intervals().unwrap(),
            vec![(0.0, 22.0), (48.0, 70.0)]
        );
    }

    #[test]
    fn derived_thresholds_match_explicit_ones() {
        let objects = vec![
            TextObject::new(0.0, 0.0, 20.0, 10.0, "ab"),
            TextObject::new(50.0, 0.0, 70.0, 10.0, "cd"),
            TextObject::new(0.0, 20.0, 20.0, 30.0, "ef"),
            TextObject::new(50.0, 20.0, 70.0, 30.0, "gh"),
        ];
        let derived = YGroups::new(AlgorithmInput::new(
            objects.iter().cloned().map(PageObject::from).collect(),
            None,
            None,
            AxisOrder::Ascending,
            AxisOrder::Ascending,
        ));
        // average height 10 and average char width 10, times 0.3
        let explicit = YGroups::new(AlgorithmInput::new(
            objects.into_iter().map(PageObject::from).collect(),
            Some(3.0),
            Some(3.0),
            AxisOrder::Ascending,
            AxisOrder::Ascending,
        ));
        assert_eq!(
            derived.y_intervals().unwrap(),
            explicit.y_intervals().unwrap()
        );
        assert_eq!(
            derived.x_intervals().unwrap(),
            explicit.x_intervals().unwrap()
        );
        assert_eq!(derived.lines().unwrap(), explicit.lines().unwrap());
    }
}
