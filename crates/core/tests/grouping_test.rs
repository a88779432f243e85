//! Properties of the grouping engine and the page-range grammar.

use pdfrows_core::geometry::{Axis, BBox, Positioned, TextObject};
use pdfrows_core::grouping::{DEFAULT_THRESHOLD_PROPORTION, define_threshold, group_objects};
use pdfrows_core::pages::{IntervalOptions, extract_intervals, parse_intervals};
use pdfrows_core::{PageSelection, PdfError};

fn grid() -> Vec<TextObject> {
    let mut objects = Vec::new();
    for row in 0..4 {
        for col in 0..3 {
            let x0 = 10.0 + 60.0 * col as f64;
            let y0 = 10.0 + 15.0 * row as f64;
            objects.push(TextObject::new(x0, y0, x0 + 40.0, y0 + 10.0, format!("r{row}c{col}")));
        }
    }
    objects
}

fn envelopes(objects: &[TextObject], axis: Axis, threshold: Option<f64>) -> Vec<BBox> {
    group_objects(axis, objects, threshold)
        .iter()
        .map(Positioned::bbox)
        .collect()
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn grouping_ignores_input_order() {
    let objects = grid();
    let mut reversed = objects.clone();
    reversed.reverse();
    for axis in [Axis::X, Axis::Y] {
        assert_eq!(
            envelopes(&objects, axis, Some(0.5)),
            envelopes(&reversed, axis, Some(0.5))
        );
    }
}

#[test]
fn regrouping_a_group_is_stable() {
    let objects = grid();
    for group in group_objects(Axis::Y, &objects, Some(0.5)) {
        let again = group_objects(Axis::Y, group.objects(), Some(0.5));
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].bbox(), group.bbox());
        assert_eq!(again[0].objects(), group.objects());
    }
}

#[test]
fn grid_splits_into_rows_and_columns() {
    let objects = grid();
    let rows = group_objects(Axis::Y, &objects, Some(0.5));
    assert_eq!(rows.len(), 4);
    let first: Vec<&str> = rows[0].iter().map(|obj| obj.text.as_str()).collect();
    assert_eq!(first, vec!["r0c0", "r0c1", "r0c2"]);

    let columns = group_objects(Axis::X, &objects, Some(0.5));
    assert_eq!(columns.len(), 3);
    let first: Vec<&str> = columns[0].iter().map(|obj| obj.text.as_str()).collect();
    assert_eq!(first, vec!["r0c0", "r1c0", "r2c0", "r3c0"]);
}

#[test]
fn derived_threshold_matches_equivalent_explicit_one() {
    let objects = grid();
    // height 10, proportion 0.3
    let derived = define_threshold(Axis::Y, &objects, DEFAULT_THRESHOLD_PROPORTION);
    assert!((derived - 3.0).abs() < 1e-9);
    assert_eq!(
        envelopes(&objects, Axis::Y, None),
        envelopes(&objects, Axis::Y, Some(3.0))
    );
    // width 40 over 4 characters, proportion 0.3
    let derived = define_threshold(Axis::X, &objects, DEFAULT_THRESHOLD_PROPORTION);
    assert!((derived - 3.0).abs() < 1e-9);
    assert_eq!(
        envelopes(&objects, Axis::X, None),
        envelopes(&objects, Axis::X, Some(3.0))
    );
}

#[test]
fn wide_threshold_merges_rows() {
    // rows are 5 apart: a threshold above that bridges them all
    assert_eq!(envelopes(&grid(), Axis::Y, Some(5.5)).len(), 1);
}

// ============================================================================
// Page ranges
// ============================================================================

#[test]
fn page_ranges_sort_and_dedupe_by_default() {
    assert_eq!(
        extract_intervals("5-7,1,6,2").unwrap(),
        vec![1, 2, 5, 6, 7]
    );
}

#[test]
fn page_ranges_can_keep_input_order() {
    let keep = IntervalOptions {
        repeat: true,
        sort: false,
    };
    assert_eq!(parse_intervals("3,1,3", keep).unwrap(), vec![3, 1, 3]);
    let first_seen = IntervalOptions {
        repeat: false,
        sort: false,
    };
    assert_eq!(parse_intervals("3,1,3", first_seen).unwrap(), vec![3, 1]);
}

#[test]
fn malformed_page_ranges_are_rejected() {
    for text in ["", "x", "1-", "1-2-3"] {
        assert!(
            matches!(text.parse::<PageSelection>(), Err(PdfError::MalformedRange(_))),
            "{text:?} should be rejected"
        );
    }
}
