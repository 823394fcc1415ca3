//! The PDF document capability a merge runs against.
//!
//! The orchestrator never touches PDF structure itself. It asks a
//! [`PdfEngine`] to load each file, copy all of its pages into an
//! accumulator document in their original order, append them at the end,
//! and finally serialize the accumulator to bytes.
//!
//! [`LopdfEngine`] is the production implementation, built on `lopdf`.

mod lopdf_engine;

pub use lopdf_engine::{LopdfAccumulator, LopdfEngine};

use std::future::Future;

use crate::error::Result;

/// A file's bytes could not be parsed as a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct LoadError {
    /// Reason reported by the parser.
    pub reason: String,
}

impl LoadError {
    /// Create a load error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Operations a merge needs from a PDF library.
///
/// Implementations must keep page order: [`copy_pages`](Self::copy_pages)
/// returns pages in the order of the requested indices and
/// [`append_pages`](Self::append_pages) appends them after every page
/// already in the accumulator.
pub trait PdfEngine: Send + Sync {
    /// Document being built by a merge.
    type Accumulator: Send;

    /// A loaded source document.
    type Document: Send;

    /// Reference to a page copied into an accumulator.
    type Page: Send;

    /// Create an empty accumulator.
    fn create_accumulator(&self) -> Result<Self::Accumulator>;

    /// Parse a document from its bytes.
    fn load_document(
        &self,
        bytes: Vec<u8>,
    ) -> impl Future<Output = std::result::Result<Self::Document, LoadError>> + Send;

    /// Indices of every page of `document`, in order.
    fn page_indices(&self, document: &Self::Document) -> Vec<usize>;

    /// Copy the pages at `indices` into the accumulator's object space.
    fn copy_pages(
        &self,
        accumulator: &mut Self::Accumulator,
        document: &Self::Document,
        indices: &[usize],
    ) -> Result<Vec<Self::Page>>;

    /// Append copied pages at the current end of the accumulator.
    fn append_pages(&self, accumulator: &mut Self::Accumulator, pages: Vec<Self::Page>)
    -> Result<()>;

    /// Number of pages currently in the accumulator.
    fn page_count(&self, accumulator: &Self::Accumulator) -> usize;

    /// Serialize the accumulator to a PDF byte buffer.
    fn serialize(&self, accumulator: Self::Accumulator) -> Result<Vec<u8>>;
}
