//! The merge pipeline.
//!
//! A [`MergeOrchestrator`] takes an ordered snapshot of pending files and
//! produces one merged document. Files are processed strictly in snapshot
//! order, one at a time: read, load, copy every page, append. The first
//! failure aborts the whole merge and nothing partial is published.
//!
//! The orchestrator owns the lifecycle state ([`MergeState`]) and at most one
//! live [`OutputArtifact`]. Starting a new merge or resetting releases the
//! previous artifact before anything else happens.
//!
//! Each merge carries its own `CancellationToken`. Reads, loads and pacing
//! pauses race against it, so a cancel ends the merge at the pending await.
//! A merge whose future is dropped before it settles goes back to idle.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactInfo, ArtifactSink, OutputArtifact};
use crate::collection::PendingFile;
use crate::config::{DEFAULT_ARTIFACT_NAME, DEFAULT_FAILURE_MESSAGE, MergeConfig};
use crate::engine::PdfEngine;
use crate::error::{PdfStackError, Result};
use crate::progress::{ProgressSink, ProgressUpdate};
use crate::state::{MergeEvent, MergeState};
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of files merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total time taken for the merge, pacing included.
    pub merge_time: Duration,

    /// Total size of the input files.
    pub input_size: u64,

    /// Size of the merged document.
    pub output_size: u64,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

struct Inner {
    state: MergeState,
    artifact: Option<OutputArtifact>,
    last: ProgressUpdate,
    /// Token of the running merge; replaced by every `Start`.
    cancel: CancellationToken,
}

impl Inner {
    fn apply(&mut self, event: MergeEvent, completed: usize, total: usize) -> ProgressUpdate {
        match self.state.transition(event) {
            Some(next) => self.state = next,
            None => warn!(state = ?self.state.tag(), "ignored illegal merge state transition"),
        }

        let fraction = match self.state {
            MergeState::Failed { .. } => self.last.fraction,
            ref state => state.progress(),
        };

        self.last = ProgressUpdate {
            fraction,
            state: self.state.tag(),
            completed,
            total,
        };
        self.last
    }
}

/// Runs merges against a [`PdfEngine`] and publishes the result through an
/// [`ArtifactSink`].
pub struct MergeOrchestrator<E: PdfEngine> {
    engine: E,
    sink: Arc<dyn ArtifactSink>,
    step_delay: Duration,
    artifact_name: String,
    failure_message: String,
    inner: Mutex<Inner>,
    subscribers: Mutex<Vec<Arc<dyn ProgressSink>>>,
}

impl<E: PdfEngine> MergeOrchestrator<E> {
    /// Create an orchestrator with no pacing and default messages.
    pub fn new(engine: E, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            engine,
            sink,
            step_delay: Duration::ZERO,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            inner: Mutex::new(Inner {
                state: MergeState::Idle,
                artifact: None,
                last: ProgressUpdate::idle(),
                cancel: CancellationToken::new(),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Create an orchestrator using the pacing and messages of `config`.
    pub fn from_config(engine: E, sink: Arc<dyn ArtifactSink>, config: &MergeConfig) -> Self {
        Self::new(engine, sink)
            .with_step_delay(config.step_delay)
            .with_artifact_name(config.artifact_name.clone())
            .with_failure_message(config.failure_message.clone())
    }

    /// Pause after each file. Zero disables pacing.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Name attached to produced artifacts.
    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    /// Message stored in the failed state.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Register a progress observer.
    pub fn subscribe(&self, sink: Arc<dyn ProgressSink>) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sink);
    }

    /// The engine merges run against.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current state.
    pub fn state(&self) -> MergeState {
        self.lock().state.clone()
    }

    /// Most recent progress notification.
    pub fn progress(&self) -> ProgressUpdate {
        self.lock().last
    }

    /// Summary of the live artifact, if any.
    pub fn artifact(&self) -> Option<ArtifactInfo> {
        self.lock().artifact.as_ref().map(|a| a.info().clone())
    }

    /// Bytes of the live artifact, if any.
    pub fn artifact_bytes(&self) -> Option<Arc<[u8]>> {
        self.lock().artifact.as_ref().map(|a| Arc::clone(a.bytes()))
    }

    /// Merge `snapshot` into one document.
    ///
    /// The previous artifact, if any, is released first. On success the
    /// state becomes [`MergeState::Completed`] and a new artifact is live.
    /// On failure the state becomes [`MergeState::Failed`] with the
    /// configured user-facing message and the detailed error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `snapshot` is empty (state unchanged)
    /// - a merge is already running (state unchanged)
    /// - a file cannot be read or parsed
    /// - the engine fails to copy, append or serialize pages
    /// - the artifact sink refuses the result
    /// - the merge was cancelled (state returns to idle)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use pdfstack::artifact::ArtifactRegistry;
    /// # use pdfstack::collection::FileCollection;
    /// # use pdfstack::engine::LopdfEngine;
    /// # use pdfstack::orchestrator::MergeOrchestrator;
    /// # async fn example(files: FileCollection) -> pdfstack::Result<()> {
    /// let orchestrator = MergeOrchestrator::new(LopdfEngine::new(), Arc::new(ArtifactRegistry::new()));
    /// let stats = orchestrator.request_merge(&files.snapshot()).await?;
    /// println!("{} files, {} pages", stats.files_merged, stats.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request_merge(&self, snapshot: &[PendingFile]) -> Result<MergeStatistics> {
        if snapshot.is_empty() {
            return Err(PdfStackError::NoFilesToMerge);
        }

        let total = snapshot.len();
        let in_flight = self.begin(total)?;
        info!(files = total, "merge started");

        let start = Instant::now();
        let outcome = self.run(snapshot, &in_flight.token).await;
        let token = in_flight.disarm();
        self.settle(outcome, snapshot, start, &token)
    }

    /// Stop the running merge at its current suspension point.
    ///
    /// A pending read, load or pause is abandoned right away. Returns
    /// `false` when no merge is running.
    pub fn cancel(&self) -> bool {
        let inner = self.lock();
        if inner.state.is_merging() {
            inner.cancel.cancel();
            debug!("merge cancellation requested");
            true
        } else {
            false
        }
    }

    /// Release the artifact and return to idle.
    ///
    /// While a merge is running this cancels it instead; the merge then
    /// settles in idle without publishing anything.
    pub fn reset(&self) {
        let update = {
            let mut inner = self.lock();
            if inner.state.is_merging() {
                inner.cancel.cancel();
                debug!("reset while merging, cancelling");
                return;
            }
            if let Some(artifact) = inner.artifact.take() {
                artifact.release();
            }
            inner.apply(MergeEvent::Reset, 0, 0)
        };
        self.notify(&update);
    }

    fn begin(&self, total: usize) -> Result<InFlight<'_, E>> {
        let token = CancellationToken::new();
        let update = {
            let mut inner = self.lock();
            if inner.state.is_merging() {
                return Err(PdfStackError::MergeInProgress);
            }
            if let Some(previous) = inner.artifact.take() {
                previous.release();
            }
            inner.cancel = token.clone();
            inner.apply(MergeEvent::Start, 0, total)
        };
        self.notify(&update);
        Ok(InFlight {
            orchestrator: self,
            token,
            total,
            armed: true,
        })
    }

    async fn run(
        &self,
        snapshot: &[PendingFile],
        token: &CancellationToken,
    ) -> Result<(Vec<u8>, usize)> {
        let total = snapshot.len();
        let mut accumulator = self.engine.create_accumulator()?;

        for (index, file) in snapshot.iter().enumerate() {
            let name = file.display_name();
            debug!(file = name, index, total, "reading file");

            let bytes = until_cancelled(token, file.source().read_bytes())
                .await?
                .map_err(|e| PdfStackError::file_read(name, e))?;

            let document = until_cancelled(token, self.engine.load_document(bytes))
                .await?
                .map_err(|e| PdfStackError::load(name, e.reason))?;

            let indices = self.engine.page_indices(&document);
            let pages = self
                .engine
                .copy_pages(&mut accumulator, &document, &indices)?;
            self.engine.append_pages(&mut accumulator, pages)?;
            debug!(file = name, pages = indices.len(), "pages appended");

            if !self.step_delay.is_zero() {
                until_cancelled(token, tokio::time::sleep(self.step_delay)).await?;
            }

            self.advance(index + 1, total);
        }

        let page_count = self.engine.page_count(&accumulator);
        let bytes = self.engine.serialize(accumulator)?;
        Ok((bytes, page_count))
    }

    fn settle(
        &self,
        outcome: Result<(Vec<u8>, usize)>,
        snapshot: &[PendingFile],
        start: Instant,
        token: &CancellationToken,
    ) -> Result<MergeStatistics> {
        let total = snapshot.len();
        let published = outcome.and_then(|(bytes, total_pages)| {
            if token.is_cancelled() {
                return Err(PdfStackError::Cancelled);
            }
            let statistics = MergeStatistics {
                files_merged: total,
                total_pages,
                merge_time: start.elapsed(),
                input_size: snapshot.iter().map(|f| f.source().size()).sum(),
                output_size: bytes.len() as u64,
            };
            let artifact = OutputArtifact::allocate(
                Arc::clone(&self.sink),
                bytes,
                self.artifact_name.as_str(),
                total_pages,
                total,
            )?;
            Ok((artifact, statistics))
        });

        let mut inner = self.lock();

        if token.is_cancelled() {
            let update = inner.apply(MergeEvent::Cancel, 0, total);
            drop(inner);
            drop(published);
            self.notify(&update);
            info!("merge cancelled");
            return Err(PdfStackError::Cancelled);
        }

        match published {
            Ok((artifact, statistics)) => {
                let artifact_info = artifact.info().clone();
                inner.artifact = Some(artifact);
                let update = inner.apply(MergeEvent::Succeed(artifact_info), total, total);
                drop(inner);
                self.notify(&update);
                info!(
                    files = statistics.files_merged,
                    pages = statistics.total_pages,
                    bytes = statistics.output_size,
                    elapsed_ms = statistics.merge_time.as_millis() as u64,
                    "merge completed"
                );
                Ok(statistics)
            }
            Err(error) => {
                let completed = inner.last.completed;
                let update =
                    inner.apply(MergeEvent::Fail(self.failure_message.clone()), completed, total);
                drop(inner);
                self.notify(&update);
                warn!(error = %error, completed, total, "merge failed");
                Err(error)
            }
        }
    }

    fn advance(&self, completed: usize, total: usize) {
        let update = self
            .lock()
            .apply(MergeEvent::Advance { completed, total }, completed, total);
        self.notify(&update);
    }

    fn notify(&self, update: &ProgressUpdate) {
        let subscribers: Vec<_> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for subscriber in subscribers {
            subscriber.on_progress(update);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drive `future` unless `token` fires first.
async fn until_cancelled<F: Future>(token: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(PdfStackError::Cancelled),
        output = future => Ok(output),
    }
}

/// A merge between `begin` and `settle`.
///
/// Dropping it while still armed means the `request_merge` future was
/// abandoned (task aborted, timeout, caller gone): the merge is cancelled
/// and the state returns to idle so later merges and resets work.
struct InFlight<'a, E: PdfEngine> {
    orchestrator: &'a MergeOrchestrator<E>,
    token: CancellationToken,
    total: usize,
    armed: bool,
}

impl<E: PdfEngine> InFlight<'_, E> {
    fn disarm(mut self) -> CancellationToken {
        self.armed = false;
        self.token.clone()
    }
}

impl<E: PdfEngine> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.token.cancel();

        let update = {
            let mut inner = self.orchestrator.lock();
            if !inner.state.is_merging() {
                return;
            }
            inner.apply(MergeEvent::Cancel, 0, self.total)
        };
        self.orchestrator.notify(&update);
        warn!(total = self.total, "merge abandoned before it settled");
    }
}
