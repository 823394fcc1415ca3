//! Integration tests for pdfstack.
//!
//! Fixtures are generated with `lopdf`: every page carries a `Marker` string
//! so the order of pages in a merged document can be asserted.

#![allow(dead_code)]

use lopdf::{Document, Object, dictionary};
use pdfstack::source::{MemoryFile, SourceHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build a PDF whose pages carry `markers`, in order.
pub fn sample_pdf(markers: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for marker in markers {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Marker" => Object::string_literal(*marker),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => markers.len() as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize sample PDF");
    bytes
}

/// Page markers of a PDF, in page order.
pub fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Merged output is not a PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).expect("Page is not a dictionary");
            let marker = page
                .get(b"Marker")
                .and_then(|m| m.as_str())
                .expect("Page has no marker");
            String::from_utf8_lossy(marker).into_owned()
        })
        .collect()
}

/// An in-memory PDF selection entry.
pub fn memory_pdf(name: &str, markers: &[&str]) -> SourceHandle {
    Arc::new(MemoryFile::pdf(name, 1_700_000_000_000, sample_pdf(markers)))
}

/// Write a sample PDF into `dir`.
pub fn write_pdf(dir: &Path, name: &str, markers: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, sample_pdf(markers)).expect("Failed to write fixture");
    path
}

/// Create a temporary output path for test results.
///
/// # Returns
///
/// A temporary file path that will be cleaned up
pub fn temp_output_path() -> tempfile::TempPath {
    tempfile::NamedTempFile::new()
        .expect("Failed to create temp file")
        .into_temp_path()
}
