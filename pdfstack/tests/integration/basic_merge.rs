//! Integration tests for basic merging.

use pdfstack::config::{CompressionLevel, MergeConfig};
use pdfstack::progress::ProgressRecorder;
use pdfstack::session::MergeSession;
use pdfstack::source::{collect_paths_for_patterns, open_paths};
use pdfstack::state::MergeStateTag;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{memory_pdf, page_markers, temp_output_path, write_pdf};

#[tokio::test]
async fn test_merge_two_documents_in_order() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1", "A2"]),
        memory_pdf("b.pdf", &["B1", "B2", "B3"]),
    ]);

    let stats = session.merge().await.unwrap();

    assert_eq!(stats.files_merged, 2);
    assert_eq!(stats.total_pages, 5);
    let bytes = session.download().unwrap();
    assert_eq!(page_markers(&bytes), vec!["A1", "A2", "B1", "B2", "B3"]);

    let artifact = session.state().artifact().cloned().unwrap();
    assert_eq!(artifact.name, "merged-document.pdf");
    assert_eq!(artifact.byte_len, bytes.len());
}

#[tokio::test]
async fn test_merge_after_reorder() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1"]),
        memory_pdf("b.pdf", &["B1"]),
        memory_pdf("c.pdf", &["C1", "C2"]),
    ]);

    // Drag the last file to the top.
    assert!(session.move_item(2, 0));
    session.merge().await.unwrap();

    let bytes = session.download().unwrap();
    assert_eq!(page_markers(&bytes), vec!["C1", "C2", "A1", "B1"]);
}

#[tokio::test]
async fn test_merge_same_document_twice() {
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files([
        memory_pdf("a.pdf", &["A1", "A2"]),
        memory_pdf("a-copy.pdf", &["A1", "A2"]),
    ]);

    session.merge().await.unwrap();

    let bytes = session.download().unwrap();
    assert_eq!(page_markers(&bytes), vec!["A1", "A2", "A1", "A2"]);
}

#[tokio::test]
async fn test_single_file_with_relaxed_guard() {
    let config = MergeConfig {
        min_files: 1,
        ..Default::default()
    };
    let mut session = MergeSession::new(config).unwrap();
    session.add_files([memory_pdf("only.pdf", &["X1", "X2"])]);

    session.merge().await.unwrap();

    assert_eq!(page_markers(&session.download().unwrap()), vec!["X1", "X2"]);
}

#[tokio::test]
async fn test_progress_reported_per_file() {
    let session_recorder = Arc::new(ProgressRecorder::new());
    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.subscribe(session_recorder.clone());
    session.add_files([
        memory_pdf("a.pdf", &["A1"]),
        memory_pdf("b.pdf", &["B1"]),
        memory_pdf("c.pdf", &["C1"]),
        memory_pdf("d.pdf", &["D1"]),
    ]);

    session.merge().await.unwrap();

    let fractions: Vec<f64> = session_recorder
        .updates()
        .iter()
        .filter(|u| u.state == MergeStateTag::Merging)
        .map(|u| u.fraction)
        .collect();
    assert_eq!(fractions, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(
        session_recorder.last().unwrap().state,
        MergeStateTag::Completed
    );
}

#[tokio::test]
async fn test_merge_files_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "01-intro.pdf", &["I1"]);
    write_pdf(temp_dir.path(), "02-body.pdf", &["B1", "B2"]);
    write_pdf(temp_dir.path(), "03-outro.pdf", &["O1"]);

    let pattern = temp_dir.path().join("*.pdf");
    let paths = collect_paths_for_patterns([pattern.to_string_lossy()]).unwrap();
    assert_eq!(paths.len(), 3);
    let sources = open_paths(&paths).await.unwrap();

    let mut session = MergeSession::new(MergeConfig::default()).unwrap();
    session.add_files(sources);
    session.merge().await.unwrap();

    let output = temp_output_path();
    let stats = session.save_artifact(&output).await.unwrap();
    assert!(stats.file_size > 0);

    let written = std::fs::read(&output).unwrap();
    assert_eq!(page_markers(&written), vec!["I1", "B1", "B2", "O1"]);
}

#[tokio::test]
async fn test_compression_levels_produce_valid_documents() {
    for compression in [
        CompressionLevel::None,
        CompressionLevel::Standard,
        CompressionLevel::Maximum,
    ] {
        let config = MergeConfig::default().with_compression(compression);
        let mut session = MergeSession::new(config).unwrap();
        session.add_files([
            memory_pdf("a.pdf", &["A1"]),
            memory_pdf("b.pdf", &["B1"]),
        ]);

        session.merge().await.unwrap();

        assert_eq!(
            page_markers(&session.download().unwrap()),
            vec!["A1", "B1"],
            "compression {compression:?}"
        );
    }
}
