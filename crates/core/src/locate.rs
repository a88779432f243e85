//! Helpers for finding text objects relative to a known label.
//!
//! Useful for form-like pages where a value sits next to, or below, a
//! fixed caption rather than inside a regular table.

use crate::geometry::{Axis, TextObject, distance};
use crate::grouping::group_objects;

const LOCATE_THRESHOLD: f64 = 0.1;

/// The object nearest to the one whose text is `text`, skipping objects
/// carrying that same text.
///
/// With `strip`, both `text` and object texts are compared trimmed.
/// Returns `None` when no object carries `text` or nothing else is left.
pub fn closest_from_text<'a>(
    objects: &'a [TextObject],
    text: &str,
    strip: bool,
) -> Option<&'a TextObject> {
    let wanted = if strip { text.trim() } else { text };
    let anchor = objects.iter().find(|obj| {
        let candidate = if strip { obj.text.trim() } else { obj.text.as_str() };
        candidate == wanted
    })?;
    let anchor = anchor.bbox();
    objects
        .iter()
        .filter(|obj| obj.text.trim() != wanted)
        .min_by(|a, b| distance(&anchor, &a.bbox()).total_cmp(&distance(&anchor, &b.bbox())))
}

/// The right-most object on the line holding an object whose text is
/// exactly `text`.
pub fn closest_same_line<'a>(objects: &'a [TextObject], text: &str) -> Option<&'a TextObject> {
    group_objects(Axis::Y, &objects.iter().collect::<Vec<_>>(), Some(LOCATE_THRESHOLD))
        .into_iter()
        .find(|line| line.iter().any(|obj| obj.text == text))
        .and_then(|line| {
            line.into_objects()
                .into_iter()
                .max_by(|a, b| a.x0.total_cmp(&b.x0))
        })
}

/// Every object in the column holding `text` (trimmed comparison), highest
/// `y0` first. Empty when `text` is not found.
pub fn same_column<'a>(objects: &'a [TextObject], text: &str) -> Vec<&'a TextObject> {
    let mut column = group_objects(Axis::X, &objects.iter().collect::<Vec<_>>(), Some(LOCATE_THRESHOLD))
        .into_iter()
        .find(|column| column.iter().any(|obj| obj.text.trim() == text))
        .map(|column| column.into_objects())
        .unwrap_or_default();
    column.sort_by(|a, b| b.y0.total_cmp(&a.y0));
    column
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Vec<TextObject> {
        vec![
            TextObject::new(0.0, 100.0, 40.0, 110.0, "Name:"),
            TextObject::new(50.0, 100.0, 120.0, 110.0, "Ada Lovelace"),
            TextObject::new(0.0, 80.0, 40.0, 90.0, "Born:"),
            TextObject::new(50.0, 80.0, 90.0, 90.0, "1815"),
            TextObject::new(0.0, 60.0, 40.0, 70.0, "Died:"),
            TextObject::new(50.0, 60.0, 90.0, 70.0, "1852"),
        ]
    }

    #[test]
    fn closest_object_skips_the_label() {
        let objects = form();
        // anchors are compared, so the label below beats the value beside it
        let found = closest_from_text(&objects, " Name: ", true).unwrap();
        assert_eq!(found.text, "Born:");
        assert!(closest_from_text(&objects, " Name: ", false).is_none());
        assert!(closest_from_text(&objects, "Missing", true).is_none());
    }

    #[test]
    fn same_line_returns_rightmost_object() {
        let objects = form();
        assert_eq!(closest_same_line(&objects, "Born:").unwrap().text, "1815");
        assert!(closest_same_line(&objects, "Born").is_none());
    }

    #[test]
    fn same_column_is_sorted_top_down() {
        let objects = form();
        let column: Vec<&str> = same_column(&objects, "1815")
            .iter()
            .map(|obj| obj.text.as_str())
            .collect();
        assert_eq!(column, vec!["Ada Lovelace", "1815", "1852"]);
        assert!(same_column(&objects, "nothing").is_empty());
    }
}
