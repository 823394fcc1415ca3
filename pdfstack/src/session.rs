//! Caller-level merge session.
//!
//! [`MergeSession`] ties a [`FileCollection`] to a [`MergeOrchestrator`] and
//! adds the rules a user-facing front end applies on top of them: a minimum
//! file count before merging, clearing stale errors and results when the
//! selection changes, and a full reset.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::artifact::{ArtifactRegistry, ArtifactSink, ArtifactWriter, WriteStatistics};
use crate::collection::{AddOutcome, FileCollection, FileId, PendingFile};
use crate::config::MergeConfig;
use crate::engine::{LopdfEngine, PdfEngine};
use crate::error::{PdfStackError, Result};
use crate::orchestrator::{MergeOrchestrator, MergeStatistics};
use crate::progress::{ProgressSink, ProgressUpdate};
use crate::source::SourceHandle;
use crate::state::MergeState;

/// Message shown when too few files are selected.
pub fn insufficient_input_message(required: usize) -> String {
    match required {
        1 => "Please upload at least one PDF file to merge.".to_string(),
        2 => "Please upload at least two PDF files to merge.".to_string(),
        n => format!("Please upload at least {n} PDF files to merge."),
    }
}

/// A file selection plus the merge that runs over it.
pub struct MergeSession<E: PdfEngine = LopdfEngine> {
    config: MergeConfig,
    files: FileCollection,
    orchestrator: Arc<MergeOrchestrator<E>>,
    sink: Arc<dyn ArtifactSink>,
    writer: ArtifactWriter,
    notice: Option<String>,
}

impl MergeSession<LopdfEngine> {
    /// Create a session merging with `lopdf` into an in-memory registry.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidConfig`] if `config` is invalid.
    pub fn new(config: MergeConfig) -> Result<Self> {
        let mut engine = LopdfEngine::new().with_compression(config.compression);
        if !config.verify_pages {
            engine = engine.without_verification();
        }
        Self::with_engine(engine, Arc::new(ArtifactRegistry::new()), config)
    }
}

impl<E: PdfEngine> MergeSession<E> {
    /// Create a session over a custom engine and artifact sink.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidConfig`] if `config` is invalid.
    pub fn with_engine(engine: E, sink: Arc<dyn ArtifactSink>, config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let orchestrator = MergeOrchestrator::from_config(engine, Arc::clone(&sink), &config);

        Ok(Self {
            config,
            files: FileCollection::new(),
            orchestrator: Arc::new(orchestrator),
            sink,
            writer: ArtifactWriter::new(),
            notice: None,
        })
    }

    /// Settings this session was built with.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// The current selection.
    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    /// Shared handle to the orchestrator, e.g. to cancel from another task.
    pub fn orchestrator(&self) -> Arc<MergeOrchestrator<E>> {
        Arc::clone(&self.orchestrator)
    }

    /// Register a progress observer.
    pub fn subscribe(&self, sink: Arc<dyn ProgressSink>) {
        self.orchestrator.subscribe(sink);
    }

    /// Current merge state.
    pub fn state(&self) -> MergeState {
        self.orchestrator.state()
    }

    /// Most recent progress notification.
    pub fn progress(&self) -> ProgressUpdate {
        self.orchestrator.progress()
    }

    /// Message to show the user, if any.
    pub fn error(&self) -> Option<String> {
        self.notice
            .clone()
            .or_else(|| self.orchestrator.state().error().map(str::to_string))
    }

    /// Add a selection of files.
    ///
    /// Any previous error and merged result are cleared, since they no
    /// longer describe the selection.
    pub fn add_files<I>(&mut self, selection: I) -> AddOutcome
    where
        I: IntoIterator<Item = SourceHandle>,
    {
        self.invalidate();
        let outcome = self.files.add(selection);
        debug!(
            added = outcome.added,
            duplicates = outcome.duplicates,
            rejected = outcome.rejected,
            total = self.files.len(),
            "selection updated"
        );
        outcome
    }

    /// Remove the file with `id`.
    pub fn remove(&mut self, id: &FileId) -> Option<PendingFile> {
        self.files.remove(id)
    }

    /// Move one file, as a single drag step does.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        self.files.move_item(from, to)
    }

    /// Apply a sequence of moves in order.
    pub fn apply_moves(&mut self, moves: &[(usize, usize)]) -> bool {
        self.files.apply_moves(moves)
    }

    /// Replace the order with `order`, a permutation of the current ids.
    pub fn reorder(&mut self, order: &[FileId]) -> bool {
        self.files.reorder(order)
    }

    /// Merge the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InsufficientInput`] without starting a merge
    /// when fewer than `min_files` files are selected. Otherwise propagates
    /// the orchestrator's error; the collection is left as it was.
    pub async fn merge(&mut self) -> Result<MergeStatistics> {
        self.notice = None;

        let actual = self.files.len();
        let required = self.config.min_files;
        if actual < required {
            debug!(actual, required, "not enough files to merge");
            self.notice = Some(insufficient_input_message(required));
            return Err(PdfStackError::InsufficientInput { required, actual });
        }

        let snapshot = self.files.snapshot();
        self.orchestrator.request_merge(&snapshot).await
    }

    /// Clear the selection, the error and any merged result.
    pub fn reset(&mut self) {
        self.files.clear();
        self.notice = None;
        self.orchestrator.reset();
        info!("session reset");
    }

    /// Bytes of the merged document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::NoArtifact`] unless a merge has completed and
    /// its result is still live.
    pub fn download(&self) -> Result<Arc<[u8]>> {
        let artifact = self.orchestrator.artifact().ok_or(PdfStackError::NoArtifact)?;
        self.sink
            .resolve(&artifact.handle)
            .ok_or(PdfStackError::NoArtifact)
    }

    /// Write the merged document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::NoArtifact`] if there is nothing to save, or
    /// [`PdfStackError::FailedToWrite`] if the write fails.
    pub async fn save_artifact(&self, path: &Path) -> Result<WriteStatistics> {
        let bytes = self.download()?;
        self.writer.save(&bytes, path).await
    }

    fn invalidate(&mut self) {
        self.notice = None;
        if !self.orchestrator.state().is_merging() {
            self.orchestrator.reset();
        }
    }
}
