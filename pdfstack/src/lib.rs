//! pdfstack - Combine an ordered selection of PDF files into one document.
//!
//! The library is split in two halves:
//!
//! - A [`FileCollection`] of pending files: an ordered, deduplicated
//!   selection that can be appended to, pruned and reordered.
//! - A [`MergeOrchestrator`] that takes a snapshot of that selection, copies
//!   every page of every file in order into one document, reports progress,
//!   and publishes the result as a revocable [`OutputArtifact`].
//!
//! [`MergeSession`] puts both together with the rules a front end needs
//! (minimum file count, clearing stale results, reset).
//!
//! # Examples
//!
//! ## Merging files from disk
//!
//! ```no_run
//! use pdfstack::config::MergeConfig;
//! use pdfstack::session::MergeSession;
//! use pdfstack::source::open_paths;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = open_paths(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]).await?;
//!
//! let mut session = MergeSession::new(MergeConfig::default())?;
//! session.add_files(sources);
//! let stats = session.merge().await?;
//! session.save_artifact(Path::new("merged.pdf")).await?;
//!
//! println!("Created {} page document", stats.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching progress
//!
//! ```no_run
//! use pdfstack::config::MergeConfig;
//! use pdfstack::progress::ProgressUpdate;
//! use pdfstack::session::MergeSession;
//! use std::sync::Arc;
//!
//! # fn example() -> pdfstack::Result<()> {
//! let session = MergeSession::new(MergeConfig::default())?;
//! session.subscribe(Arc::new(|update: &ProgressUpdate| {
//!     println!("{:?} {:.0}%", update.state, update.percent());
//! }));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod session;
pub mod source;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use artifact::{ArtifactHandle, ArtifactInfo, ArtifactRegistry, ArtifactSink, OutputArtifact};
pub use collection::{AddOutcome, FileCollection, FileId, PendingFile};
pub use config::{CompressionLevel, MergeConfig};
pub use engine::{LopdfEngine, PdfEngine};
pub use error::{PdfStackError, Result};
pub use orchestrator::{MergeOrchestrator, MergeStatistics};
pub use progress::{ProgressSink, ProgressUpdate};
pub use session::MergeSession;
pub use source::{DiskFile, FileSource, MemoryFile, SourceHandle};
pub use state::{MergeState, MergeStateTag};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
