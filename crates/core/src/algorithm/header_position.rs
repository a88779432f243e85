//! Columns anchored on the header row instead of x-grouping.

use super::{AlgorithmInput, ExtractionAlgorithm, Interval, Line, YGroups};
use crate::error::{PdfError, Result};
use crate::geometry::{BBox, TextObject};

/// Uses the rows found by [`YGroups`], but takes each object of the first
/// row as a column anchor. An object of a later row belongs to every
/// anchor its x-range intersects, first claim winning.
///
/// Meant for tables whose header cells are wider or narrower than the
/// body columns, where x-grouping would split or merge columns.
#[derive(Debug)]
pub struct HeaderPosition {
    rows: YGroups,
}

impl HeaderPosition {
    pub const NAME: &'static str = "header-position";

    pub fn new(input: AlgorithmInput) -> Self {
        Self {
            rows: YGroups::new(input),
        }
    }
}

fn x_intersects(a: &TextObject, b: &TextObject) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0
}

impl ExtractionAlgorithm for HeaderPosition {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn input(&self) -> &AlgorithmInput {
        self.rows.input()
    }

    fn table_bbox(&self) -> Result<BBox> {
        self.rows.table_bbox()
    }

    fn x_intervals(&self) -> Result<Vec<Interval>> {
        Err(PdfError::Unsupported {
            algorithm: Self::NAME,
            operation: "x_intervals",
        })
    }

    fn y_intervals(&self) -> Result<Vec<Interval>> {
        self.rows.y_intervals()
    }

    fn selected_objects(&self) -> Result<Vec<&TextObject>> {
        self.rows.selected_objects()
    }

    fn lines(&self) -> Result<Vec<Line<'_>>> {
        let mut objects = self.selected_objects()?;
        objects.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let mut y_intervals = self.y_intervals()?;
        if self.input().y_order.is_reversed() {
            y_intervals.reverse();
        }
        let Some((&(h0, h1), body)) = y_intervals.split_first() else {
            return Ok(Vec::new());
        };

        let in_row = |obj: &TextObject, y0: f64, y1: f64| y0 <= obj.y0 && obj.y0 <= y1;
        let mut used = vec![false; objects.len()];

        let header: Vec<usize> = (0..objects.len())
            .filter(|&i| in_row(objects[i], h0, h1))
            .collect();
        for &i in &header {
            used[i] = true;
        }
        let mut lines: Vec<Line<'_>> = Vec::with_capacity(y_intervals.len());
        lines.push(header.iter().map(|&i| Some(vec![objects[i]])).collect());

        for &(y0, y1) in body {
            let row: Vec<usize> = (0..objects.len())
                .filter(|&i| !used[i] && in_row(objects[i], y0, y1))
                .collect();
            let mut line = Vec::with_capacity(header.len());
            for &anchor in &header {
                let mut cell = Vec::new();
                for &i in &row {
                    if !used[i] && x_intersects(objects[anchor], objects[i]) {
                        used[i] = true;
                        cell.push(objects[i]);
                    }
                }
                line.push(Some(cell));
            }
            lines.push(line);
        }
        Ok(lines)
    }
}
