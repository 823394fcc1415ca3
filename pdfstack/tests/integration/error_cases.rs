//! Integration tests for error handling and edge cases.

use pdfstack::config::{DEFAULT_FAILURE_MESSAGE, MergeConfig};
use pdfstack::error::PdfStackError;
use pdfstack::session::MergeSession;
use pdfstack::source::{DiskFile, MemoryFile, SourceHandle};
use pdfstack::state::{MergeState, MergeStateTag};
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::{memory_pdf, page_markers, sample_pdf};

fn corrupted(name: &str) -> SourceHandle {
    Arc::new(MemoryFile::pdf(name, 1, b"this is not a document".to_vec()))
}

#[tokio::test]
async fn test_error_nonexistent_input() {
    let result = DiskFile::open(PathBuf::from("/nonexistent/file.pdf")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, PdfStackError::FileRead { .. }));
    assert!(err.is_user_fault());
}

#[tokio::test]
async fn test_error_empty_selection() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();

    let result = session.merge().await;

    assert!(matches!(
        result,
        Err(PdfStackError::InsufficientInput {
            required: 2,
            actual: 0
        })
    ));
    assert_eq!(session.state(), MergeState::Idle);
}

#[tokio::test]
async fn test_error_single_file_never_starts_merge() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([memory_pdf("one.pdf", &["1"])]);

    let result = session.merge().await;

    assert!(result.is_err());
    assert_eq!(
        session.error().as_deref(),
        Some("Please upload at least two PDF files to merge.")
    );
    // The orchestrator was never asked to do anything.
    assert_eq!(session.progress().total, 0);
    assert_eq!(session.state(), MergeState::Idle);
}

#[tokio::test]
async fn test_error_corrupted_pdf_preserves_selection() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("good.pdf", &["G1"]),
        corrupted("broken.pdf"),
        memory_pdf("later.pdf", &["L1"]),
    ]);
    let before = session.files().ids();

    let err = session.merge().await.unwrap_err();

    match &err {
        PdfStackError::Load { name, .. } => assert_eq!(name, "broken.pdf"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.files().ids(), before);
    assert_eq!(session.state().tag(), MergeStateTag::Failed);
    assert_eq!(session.error().as_deref(), Some(DEFAULT_FAILURE_MESSAGE));
    assert!(session.download().is_err());
}

#[tokio::test]
async fn test_recover_after_removing_bad_file() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1"]),
        corrupted("broken.pdf"),
        memory_pdf("b.pdf", &["B1"]),
    ]);
    assert!(session.merge().await.is_err());

    let broken = session.files().get(1).unwrap().id().clone();
    session.remove(&broken);
    session.merge().await.unwrap();

    assert_eq!(page_markers(&session.download().unwrap()), vec!["A1", "B1"]);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_error_document_without_pages() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1"]),
        Arc::new(MemoryFile::pdf("empty.pdf", 1, sample_pdf(&[]))) as SourceHandle,
    ]);

    let err = session.merge().await.unwrap_err();

    assert!(matches!(err, PdfStackError::Load { ref name, .. } if name == "empty.pdf"));
}

#[tokio::test]
async fn test_document_without_pages_allowed_when_unverified() {
    let config = MergeConfig {
        verify_pages: false,
        ..Default::default()
    };
    let mut session = MergeSession::new(config).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1"]),
        Arc::new(MemoryFile::pdf("empty.pdf", 1, sample_pdf(&[]))) as SourceHandle,
    ]);

    let stats = session.merge().await.unwrap();

    assert_eq!(stats.total_pages, 1);
}

#[tokio::test]
async fn test_error_save_before_merge() {
    let session = MergeSession::new(MergeConfig::default()).unwrap();
    let output = crate::common::temp_output_path();

    let result = session.save_artifact(&output).await;

    assert!(matches!(result, Err(PdfStackError::NoArtifact)));
}

#[test]
fn test_error_invalid_config_document() {
    let result = MergeConfig::from_json_str(r#"{ "minFiles": 0 }"#);
    assert!(matches!(result, Err(PdfStackError::InvalidConfig { .. })));

    let result = MergeConfig::from_json_str("not json");
    assert!(matches!(result, Err(PdfStackError::InvalidConfig { .. })));
}
