//! Object matchers for the `starts_after` / `ends_before` page window.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::geometry::PageObject;

type Predicate = Arc<dyn Fn(&PageObject) -> bool + Send + Sync>;

/// Selects the object that opens or closes the extraction window.
#[derive(Clone)]
pub enum ObjectMatcher {
    /// Text objects whose trimmed text equals the trimmed value.
    Text(String),
    /// Text objects whose trimmed text matches the pattern anywhere.
    Pattern(Regex),
    /// Any object accepted by the predicate.
    Predicate(Predicate),
}

impl ObjectMatcher {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&PageObject) -> bool + Send + Sync + 'static,
    {
        ObjectMatcher::Predicate(Arc::new(f))
    }

    pub fn matches(&self, obj: &PageObject) -> bool {
        match self {
            ObjectMatcher::Text(value) => obj
                .as_text()
                .is_some_and(|text| text.text.trim() == value.trim()),
            ObjectMatcher::Pattern(regex) => obj
                .as_text()
                .is_some_and(|text| regex.is_match(text.text.trim())),
            ObjectMatcher::Predicate(f) => f(obj),
        }
    }
}

impl fmt::Debug for ObjectMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectMatcher::Text(value) => f.debug_tuple("Text").field(value).finish(),
            ObjectMatcher::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            ObjectMatcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for ObjectMatcher {
    fn from(value: &str) -> Self {
        ObjectMatcher::Text(value.to_string())
    }
}

impl From<String> for ObjectMatcher {
    fn from(value: String) -> Self {
        ObjectMatcher::Text(value)
    }
}

impl From<Regex> for ObjectMatcher {
    fn from(regex: Regex) -> Self {
        ObjectMatcher::Pattern(regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{RectObject, TextObject};

    fn text(s: &str) -> PageObject {
        TextObject::new(0.0, 0.0, 1.0, 1.0, s).into()
    }

    #[test]
    fn exact_text_ignores_surrounding_whitespace() {
        let matcher = ObjectMatcher::from(" Total ");
        assert!(matcher.matches(&text("Total\n")));
        assert!(!matcher.matches(&text("Totals")));
    }

    #[test]
    fn pattern_searches_trimmed_text() {
        let matcher = ObjectMatcher::from(Regex::new(r"^Page \d+$").unwrap());
        assert!(matcher.matches(&text("  Page 12 ")));
        assert!(!matcher.matches(&text("Page twelve")));
    }

    #[test]
    fn text_matchers_skip_rects() {
        let rect: PageObject = RectObject::new(0.0, 0.0, 1.0, 1.0, true).into();
        assert!(!ObjectMatcher::from("").matches(&rect));
        assert!(ObjectMatcher::predicate(|obj| obj.as_rect().is_some()).matches(&rect));
    }
}
