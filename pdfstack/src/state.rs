//! The merge lifecycle as a pure state machine.
//!
//! ```text
//! Idle ──Start──▶ Merging ──Succeed──▶ Completed
//!  ▲                │  │                 │  │
//!  │         Cancel │  └──Fail──▶ Failed │  │
//!  └────────────────┘             │      │  │
//!  ◀──────────Reset───────────────┘      │  │
//!  ◀──────────Reset──────────────────────┘  │
//!                 Merging ◀──Start──────────┘ (also from Failed)
//! ```
//!
//! [`MergeState::transition`] never mutates; it returns the next state or
//! `None` when the event is not allowed in the current state.

use serde::Serialize;

use crate::artifact::ArtifactInfo;

/// Discriminant of a [`MergeState`], for progress notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStateTag {
    /// Nothing running, nothing produced.
    Idle,
    /// A merge is running.
    Merging,
    /// A merged document is available.
    Completed,
    /// The last merge failed.
    Failed,
}

/// State of the merge lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MergeState {
    /// Initial state.
    Idle,
    /// Running; `progress` is in `0.0..=1.0`.
    Merging {
        /// Fraction of files processed.
        progress: f64,
    },
    /// Finished; the artifact is live.
    Completed {
        /// The produced document.
        artifact: ArtifactInfo,
    },
    /// Aborted with a user-facing description.
    Failed {
        /// Message shown to the user.
        description: String,
    },
}

/// Inputs of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// A merge was requested.
    Start,
    /// `completed` of `total` files are in the accumulator.
    Advance {
        /// Files processed so far.
        completed: usize,
        /// Files in the snapshot.
        total: usize,
    },
    /// The merged document was produced.
    Succeed(ArtifactInfo),
    /// The merge aborted.
    Fail(String),
    /// The user cancelled the running merge.
    Cancel,
    /// The user started over.
    Reset,
}

impl MergeState {
    /// Discriminant of this state.
    pub fn tag(&self) -> MergeStateTag {
        match self {
            Self::Idle => MergeStateTag::Idle,
            Self::Merging { .. } => MergeStateTag::Merging,
            Self::Completed { .. } => MergeStateTag::Completed,
            Self::Failed { .. } => MergeStateTag::Failed,
        }
    }

    /// Whether a merge is running.
    pub fn is_merging(&self) -> bool {
        matches!(self, Self::Merging { .. })
    }

    /// Progress fraction implied by this state.
    pub fn progress(&self) -> f64 {
        match self {
            Self::Merging { progress } => *progress,
            Self::Completed { .. } => 1.0,
            Self::Idle | Self::Failed { .. } => 0.0,
        }
    }

    /// Artifact summary when completed.
    pub fn artifact(&self) -> Option<&ArtifactInfo> {
        match self {
            Self::Completed { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// Failure description when failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { description } => Some(description),
            _ => None,
        }
    }

    /// Compute the state that follows `event`, if the event is allowed.
    pub fn transition(&self, event: MergeEvent) -> Option<MergeState> {
        match (self, event) {
            (Self::Merging { .. }, MergeEvent::Start) => None,
            (_, MergeEvent::Start) => Some(Self::Merging { progress: 0.0 }),

            (Self::Merging { progress }, MergeEvent::Advance { completed, total }) => {
                if total == 0 || completed > total {
                    return None;
                }
                let next = completed as f64 / total as f64;
                (next >= *progress).then_some(Self::Merging { progress: next })
            }

            (Self::Merging { .. }, MergeEvent::Succeed(artifact)) => {
                Some(Self::Completed { artifact })
            }
            (Self::Merging { .. }, MergeEvent::Fail(description)) => {
                Some(Self::Failed { description })
            }
            (Self::Merging { .. }, MergeEvent::Cancel) => Some(Self::Idle),

            (Self::Merging { .. }, MergeEvent::Reset) => None,
            (_, MergeEvent::Reset) => Some(Self::Idle),

            _ => None,
        }
    }
}

impl Default for MergeState {
    fn default() -> Self {
        Self::Idle
    }
}
