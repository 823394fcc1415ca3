//! Error types for pdfstack.
//!
//! Errors are split by who can act on them:
//!
//! - **Input errors**: a selected file could not be read or is not a PDF the
//!   engine understands, or too few files were selected. The user fixes these
//!   by changing the selection.
//! - **Lifecycle errors**: a merge was requested while another one is running,
//!   or the running merge was cancelled.
//! - **Output errors**: the merged artifact could not be allocated or saved.
//!
//! The merge state machine never stores these errors verbatim. It keeps one
//! generic, human-readable description and the detailed error is returned to
//! the caller (and logged).

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstack operations.
pub type Result<T> = std::result::Result<T, PdfStackError>;

/// Main error type for pdfstack operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfStackError {
    /// Reading the bytes of a pending file failed.
    #[error("Failed to read file: {name}\n  Reason: {source}")]
    FileRead {
        /// Display name of the file.
        name: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The engine could not parse a file as a PDF document.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    Load {
        /// Display name of the file.
        name: String,
        /// Reason reported by the engine.
        reason: String,
    },

    /// Fewer files are selected than a merge needs.
    #[error("Please upload at least {required} PDF files to merge (got {actual})")]
    InsufficientInput {
        /// Minimum number of files.
        required: usize,
        /// Number of files currently selected.
        actual: usize,
    },

    /// The orchestrator was handed an empty snapshot.
    #[error("No PDF files to merge")]
    NoFilesToMerge,

    /// A merge is already running.
    #[error("A merge is already in progress")]
    MergeInProgress,

    /// The engine failed while copying or serializing pages.
    #[error("PDF engine failure: {reason}")]
    Engine {
        /// Description of what went wrong.
        reason: String,
    },

    /// The artifact sink refused to allocate a handle.
    #[error("Failed to allocate output artifact: {reason}")]
    ArtifactAllocation {
        /// Description of what went wrong.
        reason: String,
    },

    /// There is no completed artifact to hand out.
    #[error("No merged document is available")]
    NoArtifact,

    /// The running merge was cancelled by the user.
    #[error("Merge cancelled by user")]
    Cancelled,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// A glob pattern could not be parsed or walked.
    #[error("Failed to expand pattern: {message}")]
    Glob {
        /// Error reported by the glob walker.
        message: String,
    },

    /// Writing the merged document to disk failed.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<lopdf::Error> for PdfStackError {
    fn from(err: lopdf::Error) -> Self {
        Self::engine(err.to_string())
    }
}

impl From<glob::PatternError> for PdfStackError {
    fn from(err: glob::PatternError) -> Self {
        Self::Glob {
            message: err.to_string(),
        }
    }
}

impl From<glob::GlobError> for PdfStackError {
    fn from(err: glob::GlobError) -> Self {
        Self::Glob {
            message: err.to_string(),
        }
    }
}

impl PdfStackError {
    /// Create a FileRead error.
    pub fn file_read(name: impl Into<String>, source: io::Error) -> Self {
        Self::FileRead {
            name: name.into(),
            source,
        }
    }

    /// Create a Load error.
    pub fn load(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an Engine error.
    pub fn engine(reason: impl Into<String>) -> Self {
        Self::Engine {
            reason: reason.into(),
        }
    }

    /// Create an ArtifactAllocation error.
    pub fn artifact_allocation(reason: impl Into<String>) -> Self {
        Self::ArtifactAllocation {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if the user can fix this error by changing the file selection.
    pub fn is_user_fault(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. }
                | Self::Load { .. }
                | Self::InsufficientInput { .. }
                | Self::NoFilesToMerge
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileRead { .. } => 2,
            Self::Load { .. } => 3,
            Self::InsufficientInput { .. } => 1,
            Self::NoFilesToMerge => 1,
            Self::MergeInProgress => 1,
            Self::Engine { .. } => 6,
            Self::ArtifactAllocation { .. } => 6,
            Self::NoArtifact => 6,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::InvalidConfig { .. } => 1,
            Self::Glob { .. } => 2,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
        }
    }
}
