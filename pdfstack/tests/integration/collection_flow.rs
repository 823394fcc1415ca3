//! Integration tests for building and rearranging a selection.

use pdfstack::collection::FileCollection;
use pdfstack::config::MergeConfig;
use pdfstack::session::MergeSession;
use pdfstack::source::{DiskFile, MemoryFile, OCTET_STREAM_CONTENT_TYPE, SourceHandle};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{memory_pdf, page_markers, sample_pdf, write_pdf};

fn names(collection: &FileCollection) -> Vec<&str> {
    collection.iter().map(|f| f.display_name()).collect()
}

#[test]
fn test_adding_same_file_twice_keeps_one_entry() {
    let mut collection = FileCollection::new();
    let file = memory_pdf("report.pdf", &["R1"]);

    let first = collection.add([Arc::clone(&file)]);
    let second = collection.add([file]);

    assert_eq!(first.added, 1);
    assert_eq!(second.added, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_same_name_different_content_is_distinct() {
    let mut collection = FileCollection::new();
    collection.add([
        Arc::new(MemoryFile::pdf("scan.pdf", 1, sample_pdf(&["a"]))) as SourceHandle,
        Arc::new(MemoryFile::pdf("scan.pdf", 2, sample_pdf(&["a"]))),
    ]);
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_mixed_selection_keeps_pdfs_in_order() {
    let mut collection = FileCollection::new();
    let outcome = collection.add([
        memory_pdf("one.pdf", &["1"]),
        Arc::new(MemoryFile::new(
            "photo.jpg",
            "image/jpeg",
            1,
            vec![0xFF, 0xD8],
        )) as SourceHandle,
        memory_pdf("two.pdf", &["2"]),
        Arc::new(MemoryFile::new(
            "blob.bin",
            OCTET_STREAM_CONTENT_TYPE,
            1,
            vec![0],
        )),
    ]);

    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.rejected, 2);
    assert_eq!(names(&collection), vec!["one.pdf", "two.pdf"]);
}

#[test]
fn test_remove_then_reorder() {
    let mut collection = FileCollection::new();
    collection.add([
        memory_pdf("a.pdf", &["a"]),
        memory_pdf("b.pdf", &["b"]),
        memory_pdf("c.pdf", &["c"]),
    ]);

    let b = collection.get(1).unwrap().id().clone();
    assert!(collection.remove(&b).is_some());
    assert!(collection.remove(&b).is_none());

    let mut order = collection.ids();
    order.reverse();
    assert!(collection.reorder(&order));
    assert_eq!(names(&collection), vec!["c.pdf", "a.pdf"]);

    // A stale order naming a removed file is refused.
    let stale = vec![b, order[0].clone()];
    assert!(!collection.reorder(&stale));
    assert_eq!(names(&collection), vec!["c.pdf", "a.pdf"]);
}

#[test]
fn test_sequence_of_drags() {
    let mut collection = FileCollection::new();
    collection.add([
        memory_pdf("a.pdf", &["a"]),
        memory_pdf("b.pdf", &["b"]),
        memory_pdf("c.pdf", &["c"]),
        memory_pdf("d.pdf", &["d"]),
    ]);

    assert!(collection.apply_moves(&[(0, 3), (2, 0)]));

    assert_eq!(names(&collection), vec!["d.pdf", "b.pdf", "c.pdf", "a.pdf"]);
}

#[tokio::test]
async fn test_disk_files_identity_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pdf(temp_dir.path(), "doc.pdf", &["D1"]);

    let first: SourceHandle = Arc::new(DiskFile::open(&path).await.unwrap());
    let again: SourceHandle = Arc::new(DiskFile::open(&path).await.unwrap());

    let mut collection = FileCollection::new();
    let outcome = collection.add([first, again]);

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.duplicates, 1);
}

#[tokio::test]
async fn test_session_edits_between_merges() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1"]),
        memory_pdf("b.pdf", &["B1"]),
        memory_pdf("c.pdf", &["C1"]),
    ]);
    session.merge().await.unwrap();
    assert_eq!(
        page_markers(&session.download().unwrap()),
        vec!["A1", "B1", "C1"]
    );

    let a = session.files().get(0).unwrap().id().clone();
    session.remove(&a);
    session.move_item(1, 0);
    session.merge().await.unwrap();

    assert_eq!(
        page_markers(&session.download().unwrap()),
        vec!["C1", "B1"]
    );
}
