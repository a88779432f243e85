//! Backend registry and document-level entry points.

use pdfrows_core::backend::{PageTexts, open_backend};
use pdfrows_core::{
    AxisOrder, Backend, BackendKind, MemoryBackend, PageSelection, PdfError, Source, TextObject,
    default_backend,
};

#[test]
fn backend_names_round_trip() {
    for kind in BackendKind::ALL {
        assert_eq!(kind.name().parse::<BackendKind>().unwrap(), kind);
    }
}

#[test]
fn default_backend_is_available_or_a_configuration_error() {
    match default_backend() {
        Ok(kind) => assert!(kind.is_available()),
        Err(err) => {
            assert!(matches!(err, PdfError::Configuration(_)));
            let message = err.to_string();
            assert!(message.contains("pdfium"));
            assert!(message.contains("pdf-extract"));
        }
    }
}

#[cfg(feature = "pdf-extract")]
#[test]
fn missing_document_fails_on_first_use() {
    let mut backend = open_backend(
        Some(BackendKind::PdfExtract),
        "/nonexistent/path/to/file.pdf",
    )
    .unwrap();
    assert_eq!(backend.name(), "pdf-extract");
    assert_eq!(backend.y_order(), AxisOrder::Descending);
    assert!(matches!(backend.page_count(), Err(PdfError::Resource(_))));
}

#[cfg(feature = "pdf-extract")]
#[test]
fn garbage_bytes_are_a_resource_error() {
    let mut backend = open_backend(
        Some(BackendKind::PdfExtract),
        Source::Bytes(b"not a pdf".to_vec()),
    )
    .unwrap();
    assert!(matches!(backend.all_objects(0), Err(PdfError::Resource(_))));
}

#[test]
fn page_texts_skip_unselected_pages() {
    let pages = (1..=4)
        .map(|n| vec![TextObject::new(0.0, 0.0, 10.0, 10.0, format!("page {n}")).into()])
        .collect();
    let backend = MemoryBackend::new(pages, AxisOrder::Ascending);
    let texts: Vec<String> = PageTexts::new(Box::new(backend), &"2-3".parse::<PageSelection>().unwrap())
        .collect::<pdfrows_core::Result<_>>()
        .unwrap();
    assert_eq!(texts, vec!["page 2", "page 3"]);
}
