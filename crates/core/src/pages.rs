//! Page number selection and the compact range grammar (`"1,3,5-10"`).

use std::str::FromStr;

use indexmap::IndexSet;

use crate::error::{PdfError, Result};

/// How [`parse_intervals`] post-processes the parsed numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalOptions {
    /// Keep duplicated numbers.
    pub repeat: bool,
    /// Sort the result ascending.
    pub sort: bool,
}

impl Default for IntervalOptions {
    fn default() -> Self {
        Self {
            repeat: false,
            sort: true,
        }
    }
}

fn parse_number(value: &str, ranges: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| PdfError::MalformedRange(format!("invalid number {value:?} in {ranges:?}")))
}

/// Parse comma-separated integers and inclusive `start-end` ranges.
///
/// A range whose end is lower than its start contributes nothing.
pub fn parse_intervals(text: &str, options: IntervalOptions) -> Result<Vec<usize>> {
    let mut result = Vec::new();
    for value in text.split(',') {
        let value = value.trim();
        if value.contains('-') {
            let mut bounds = value.split('-');
            let (Some(start), Some(end), None) = (bounds.next(), bounds.next(), bounds.next())
            else {
                return Err(PdfError::MalformedRange(format!(
                    "invalid range {value:?} in {text:?}"
                )));
            };
            let start = parse_number(start, text)?;
            let end = parse_number(end, text)?;
            result.extend(start..=end);
        } else {
            result.push(parse_number(value, text)?);
        }
    }

    if !options.repeat {
        result = result
            .into_iter()
            .collect::<IndexSet<usize>>()
            .into_iter()
            .collect();
    }
    if options.sort {
        result.sort_unstable();
    }
    Ok(result)
}

/// [`parse_intervals`] with the default options: deduplicated and sorted.
pub fn extract_intervals(text: &str) -> Result<Vec<usize>> {
    parse_intervals(text, IntervalOptions::default())
}

/// Which pages (1-based) to process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    Numbers(Vec<usize>),
}

impl PageSelection {
    /// Whether the 1-based `page_number` is selected.
    pub fn contains(&self, page_number: usize) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Numbers(numbers) => numbers.contains(&page_number),
        }
    }

    /// 0-based indices of the selected pages among `page_count`, in
    /// document order.
    pub fn indices(&self, page_count: usize) -> Vec<usize> {
        (1..=page_count)
            .filter(|&number| self.contains(number))
            .map(|number| number - 1)
            .collect()
    }
}

impl FromStr for PageSelection {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        extract_intervals(s).map(PageSelection::Numbers)
    }
}

impl From<Vec<usize>> for PageSelection {
    fn from(numbers: Vec<usize>) -> Self {
        PageSelection::Numbers(numbers)
    }
}
