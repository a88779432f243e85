//! Error types for pdfrows table extraction.

use thiserror::Error;

/// Primary error type for table extraction operations.
#[derive(Error, Debug)]
pub enum PdfError {
    /// No usable PDF engine was compiled in or could be loaded.
    #[error("no PDF backend found: {0}")]
    Configuration(String),

    /// A backend or algorithm name that is not registered.
    #[error("unknown {kind} \"{name}\" (options are: {options})")]
    UnknownIdentifier {
        kind: &'static str,
        name: String,
        options: String,
    },

    #[error("malformed page range: {0}")]
    MalformedRange(String),

    /// The document could not be read from disk or parsed by the backend.
    #[error("cannot read document: {0}")]
    Resource(String),

    #[error("no filled rectangles found on page")]
    NoFilledRects,

    #[error("{algorithm} does not support {operation}")]
    Unsupported {
        algorithm: &'static str,
        operation: &'static str,
    },
}

impl PdfError {
    pub(crate) fn unknown(kind: &'static str, name: &str, options: &[&str]) -> Self {
        PdfError::UnknownIdentifier {
            kind,
            name: name.to_string(),
            options: options.join(", "),
        }
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
