//! A backend over pages of objects held in memory.

use crate::error::{PdfError, Result};
use crate::geometry::{AxisOrder, PageObject};

use super::{Backend, sort_reading_order};

/// Pages of already-positioned objects, for callers that run their own
/// PDF engine and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    pages: Vec<Vec<PageObject>>,
    y_order: AxisOrder,
}

impl MemoryBackend {
    pub const NAME: &'static str = "memory";

    pub fn new(pages: Vec<Vec<PageObject>>, y_order: AxisOrder) -> Self {
        Self { pages, y_order }
    }

    /// Append a page.
    pub fn push_page(&mut self, objects: Vec<PageObject>) {
        self.pages.push(objects);
    }

    fn page(&self, index: usize) -> Result<&[PageObject]> {
        self.pages.get(index).map(Vec::as_slice).ok_or_else(|| {
            PdfError::Resource(format!(
                "page {} out of range (document has {} pages)",
                index + 1,
                self.pages.len()
            ))
        })
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn y_order(&self) -> AxisOrder {
        self.y_order
    }

    fn page_count(&mut self) -> Result<usize> {
        Ok(self.pages.len())
    }

    /// Trimmed texts joined by newlines, in reading order.
    fn page_text(&mut self, index: usize) -> Result<String> {
        let mut objects = self.page(index)?.to_vec();
        sort_reading_order(&mut objects, self.y_order);
        let lines: Vec<&str> = objects
            .iter()
            .filter_map(PageObject::as_text)
            .map(|obj| obj.text.trim())
            .collect();
        Ok(lines.join("\n"))
    }

    fn all_objects(&mut self, index: usize) -> Result<Vec<PageObject>> {
        Ok(self.page(index)?.to_vec())
    }
}
