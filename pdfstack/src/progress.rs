//! Progress notifications.
//!
//! A [`ProgressSink`] receives a [`ProgressUpdate`] whenever the merge state
//! changes or another file has been copied. Any `Fn(&ProgressUpdate)` closure
//! is a sink.
//!
//! # Examples
//!
//! ```
//! use pdfstack::progress::{ProgressSink, ProgressUpdate};
//! use pdfstack::state::MergeStateTag;
//!
//! let sink = |update: &ProgressUpdate| {
//!     if update.state == MergeStateTag::Merging {
//!         println!("{:.0}%", update.percent());
//!     }
//! };
//! sink.on_progress(&ProgressUpdate::idle());
//! assert_eq!(ProgressUpdate::idle().state, MergeStateTag::Idle);
//! ```

use serde::Serialize;
use std::sync::Mutex;

use crate::state::MergeStateTag;

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Fraction of files processed, `0.0..=1.0`.
    pub fraction: f64,
    /// Current state.
    pub state: MergeStateTag,
    /// Files processed so far.
    pub completed: usize,
    /// Files in the running (or last) merge.
    pub total: usize,
}

impl ProgressUpdate {
    /// The resting update: idle, nothing processed.
    pub fn idle() -> Self {
        Self {
            fraction: 0.0,
            state: MergeStateTag::Idle,
            completed: 0,
            total: 0,
        }
    }

    /// Progress as a percentage.
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

impl Default for ProgressUpdate {
    fn default() -> Self {
        Self::idle()
    }
}

/// Receiver of progress notifications.
pub trait ProgressSink: Send + Sync {
    /// Called after every state change and file step.
    fn on_progress(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Sink that keeps every update it receives.
#[derive(Debug, Default)]
pub struct ProgressRecorder {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl ProgressRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates so far, oldest first.
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The fractions of all updates so far.
    pub fn fractions(&self) -> Vec<f64> {
        self.updates().iter().map(|u| u.fraction).collect()
    }

    /// The most recent update.
    pub fn last(&self) -> Option<ProgressUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    /// Forget recorded updates.
    pub fn clear(&self) {
        self.updates.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl ProgressSink for ProgressRecorder {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*update);
    }
}
