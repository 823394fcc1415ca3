//! The merged document and the revocable handle that exposes it.
//!
//! An [`OutputArtifact`] owns the merged bytes and one handle allocated from
//! an [`ArtifactSink`]. The handle is released exactly once: explicitly via
//! [`OutputArtifact::release`], or when the artifact is dropped. Since the
//! orchestrator stores at most one artifact, the number of allocations minus
//! releases on a sink it uses is always 0 or 1.

pub mod writer;

pub use writer::{ArtifactWriter, WriteStatistics};

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::utils::format_file_size;

/// Revocable reference to artifact bytes, e.g. a download URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactHandle(String);

impl ArtifactHandle {
    /// Wrap a handle string issued by a sink.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and revokes handles bound to artifact bytes.
pub trait ArtifactSink: Send + Sync {
    /// Bind `bytes` to a new handle.
    ///
    /// A sink that cannot hold the document (storage full, bridge gone)
    /// returns [`PdfStackError::artifact_allocation`]; the merge then fails
    /// and nothing is published.
    ///
    /// [`PdfStackError::artifact_allocation`]: crate::error::PdfStackError::artifact_allocation
    fn allocate(&self, bytes: Arc<[u8]>) -> Result<ArtifactHandle>;

    /// Revoke a handle. Called exactly once per allocated handle.
    fn release(&self, handle: &ArtifactHandle);

    /// Bytes bound to a live handle.
    fn resolve(&self, handle: &ArtifactHandle) -> Option<Arc<[u8]>>;
}

/// Summary of a completed artifact, safe to clone into state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    /// Handle the bytes can be fetched with.
    pub handle: ArtifactHandle,
    /// Suggested file name.
    pub name: String,
    /// Size of the merged document.
    pub byte_len: usize,
    /// Pages in the merged document.
    pub page_count: usize,
    /// Files that went into it.
    pub file_count: usize,
}

impl ArtifactInfo {
    /// Format the document size as a human-readable string.
    pub fn format_size(&self) -> String {
        format_file_size(self.byte_len as u64)
    }
}

/// The merged document, holding a live handle until released.
pub struct OutputArtifact {
    info: ArtifactInfo,
    bytes: Arc<[u8]>,
    sink: Arc<dyn ArtifactSink>,
    released: bool,
}

impl OutputArtifact {
    /// Allocate a handle for `bytes` and wrap both.
    ///
    /// # Errors
    ///
    /// Propagates the sink's allocation error. Nothing is left allocated.
    pub fn allocate(
        sink: Arc<dyn ArtifactSink>,
        bytes: Vec<u8>,
        name: impl Into<String>,
        page_count: usize,
        file_count: usize,
    ) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let handle = sink.allocate(Arc::clone(&bytes))?;
        tracing::debug!(handle = %handle, bytes = bytes.len(), "artifact allocated");

        Ok(Self {
            info: ArtifactInfo {
                handle,
                name: name.into(),
                byte_len: bytes.len(),
                page_count,
                file_count,
            },
            bytes,
            sink,
            released: false,
        })
    }

    /// Summary of this artifact.
    pub fn info(&self) -> &ArtifactInfo {
        &self.info
    }

    /// Handle bound to the bytes.
    pub fn handle(&self) -> &ArtifactHandle {
        &self.info.handle
    }

    /// The merged document.
    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    /// Revoke the handle now instead of on drop.
    pub fn release(mut self) {
        self.release_handle();
    }

    fn release_handle(&mut self) {
        if !self.released {
            self.released = true;
            self.sink.release(&self.info.handle);
            tracing::debug!(handle = %self.info.handle, "artifact released");
        }
    }
}

impl Drop for OutputArtifact {
    fn drop(&mut self) {
        self.release_handle();
    }
}

impl fmt::Debug for OutputArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputArtifact")
            .field("info", &self.info)
            .field("released", &self.released)
            .finish()
    }
}

/// In-memory sink issuing `blob:` style handles.
#[derive(Debug)]
pub struct ArtifactRegistry {
    prefix: String,
    live: Mutex<HashMap<ArtifactHandle, Arc<[u8]>>>,
    next_id: AtomicU64,
    allocations: AtomicUsize,
    releases: AtomicUsize,
}

impl ArtifactRegistry {
    /// Create a registry whose handles start with `blob:pdfstack/`.
    pub fn new() -> Self {
        Self::with_prefix("blob:pdfstack/")
    }

    /// Create a registry with a custom handle prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            live: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    /// Handles currently bound to bytes.
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Total handles ever allocated.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Total handles ever released.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactSink for ArtifactRegistry {
    fn allocate(&self, bytes: Arc<[u8]>) -> Result<ArtifactHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = ArtifactHandle::new(format!("{}{id}", self.prefix));

        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(handle.clone(), bytes);
        self.allocations.fetch_add(1, Ordering::SeqCst);

        Ok(handle)
    }

    fn release(&self, handle: &ArtifactHandle) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(handle);

        if removed.is_some() {
            self.releases.fetch_add(1, Ordering::SeqCst);
        } else {
            tracing::warn!(handle = %handle, "release of unknown artifact handle");
        }
    }

    fn resolve(&self, handle: &ArtifactHandle) -> Option<Arc<[u8]>> {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(handle)
            .cloned()
    }
}
