//! High-level API module for table and text extraction.
//!
//! # Example
//!
//! ```ignore
//! use pdfrows_core::api::{TableOptions, extract_table};
//!
//! for row in extract_table("report.pdf", TableOptions::default())? {
//!     println!("{:?}", row?);
//! }
//! ```

pub mod builder;
pub mod high_level;

// Re-export for convenience
pub use builder::TableExtractor;
pub use high_level::{
    DEFAULT_THRESHOLD, TableLines, TableOptions, cell_text, document_text, extract_table,
    extract_table_with_backend, extract_text, number_of_pages,
};
