//! pdfrows - table extraction from positioned PDF text.
//!
//! Text objects are clustered into rows and columns by geometric
//! interception; an extraction algorithm turns the clusters of each page
//! into a matrix of cells, and the pages are stitched into one stream of
//! rows with repeated headers removed.

pub mod algorithm;
pub mod api;
pub mod backend;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod locate;
pub mod matcher;
pub mod pages;

pub use algorithm::{Algorithm, AlgorithmChoice, ExtractionAlgorithm};
pub use api::{
    TableExtractor, TableLines, TableOptions, document_text, extract_table,
    extract_table_with_backend, extract_text, number_of_pages,
};
pub use backend::{Backend, BackendKind, MemoryBackend, Source, default_backend};
pub use error::{PdfError, Result};
pub use geometry::{AxisOrder, BBox, PageObject, RectObject, TextObject, TextStyle};
pub use matcher::ObjectMatcher;
pub use pages::PageSelection;
