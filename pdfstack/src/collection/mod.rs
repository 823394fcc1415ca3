//! The ordered, deduplicated collection of pending documents.
//!
//! The collection is a plain state container: it never performs I/O and
//! none of its operations fail. Unsupported entries, repeated selections,
//! removals of unknown ids and out-of-range moves are all absorbed.
//!
//! # Examples
//!
//! ```
//! use pdfstack::collection::FileCollection;
//! use pdfstack::source::{MemoryFile, SourceHandle};
//! use std::sync::Arc;
//!
//! let a: SourceHandle = Arc::new(MemoryFile::pdf("a.pdf", 1, b"a".to_vec()));
//! let b: SourceHandle = Arc::new(MemoryFile::pdf("b.pdf", 2, b"b".to_vec()));
//!
//! let mut files = FileCollection::new();
//! files.add([a.clone(), b]);
//! files.add([a]); // re-selecting is a no-op
//! assert_eq!(files.len(), 2);
//!
//! files.move_item(0, 1);
//! let names: Vec<&str> = files.iter().map(|f| f.display_name()).collect();
//! assert_eq!(names, ["b.pdf", "a.pdf"]);
//! ```

pub mod reorder;

use std::collections::HashSet;
use std::fmt;

use crate::source::{FileSource, PDF_CONTENT_TYPE, SourceHandle};
use crate::utils::format_display_size;

/// Identity of a pending file: name, modification time and size.
///
/// Selecting the same file twice yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId {
    name: String,
    last_modified: i64,
    size: u64,
}

impl FileId {
    /// Derive the id of a file source.
    pub fn of(source: &dyn FileSource) -> Self {
        Self {
            name: source.name().to_string(),
            last_modified: source.last_modified(),
            size: source.size(),
        }
    }

    /// File name part of the id.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.last_modified, self.size)
    }
}

/// A document waiting to be merged.
#[derive(Debug, Clone)]
pub struct PendingFile {
    id: FileId,
    source: SourceHandle,
    display_name: String,
    display_size: String,
}

impl PendingFile {
    /// Wrap a source, deriving its id and display fields.
    pub fn new(source: SourceHandle) -> Self {
        Self {
            id: FileId::of(source.as_ref()),
            display_name: source.name().to_string(),
            display_size: format_display_size(source.size()),
            source,
        }
    }

    /// Identity of this file.
    pub fn id(&self) -> &FileId {
        &self.id
    }

    /// Underlying content handle. Read lazily during a merge.
    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    /// Name shown in file lists.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Size shown in file lists, e.g. `"1.50 MB"`.
    pub fn display_size(&self) -> &str {
        &self.display_size
    }
}

/// What happened to a selection handed to [`FileCollection::add`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Entries appended to the collection.
    pub added: usize,
    /// Entries dropped because their id was already present.
    pub duplicates: usize,
    /// Entries dropped because they are not declared as PDF.
    pub rejected: usize,
}

/// Ordered sequence of pending files with unique ids.
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    files: Vec<PendingFile>,
}

impl FileCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the PDF entries of a selection that are not already present.
    ///
    /// Non-PDF entries and repeats (including repeats within the same
    /// selection) are dropped. Survivors keep the order they were received
    /// in and go after every existing entry.
    pub fn add<I>(&mut self, selection: I) -> AddOutcome
    where
        I: IntoIterator<Item = SourceHandle>,
    {
        let mut seen: HashSet<FileId> = self.files.iter().map(|f| f.id.clone()).collect();
        let mut outcome = AddOutcome::default();

        for source in selection {
            if !source.content_type().eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
                tracing::debug!(
                    file = source.name(),
                    content_type = source.content_type(),
                    "dropping non-PDF entry"
                );
                outcome.rejected += 1;
                continue;
            }

            let pending = PendingFile::new(source);
            if !seen.insert(pending.id.clone()) {
                tracing::debug!(file = %pending.id, "dropping duplicate entry");
                outcome.duplicates += 1;
                continue;
            }

            self.files.push(pending);
            outcome.added += 1;
        }

        tracing::debug!(
            added = outcome.added,
            duplicates = outcome.duplicates,
            rejected = outcome.rejected,
            total = self.files.len(),
            "selection added"
        );
        outcome
    }

    /// Remove the entry with the given id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &FileId) -> Option<PendingFile> {
        let index = self.position(id)?;
        let removed = self.files.remove(index);
        tracing::debug!(file = %id, index, "file removed");
        Some(removed)
    }

    /// Move the entry at `from` to index `to` (one drag step).
    ///
    /// Returns `true` if the order changed.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        self.apply_moves(&[(from, to)])
    }

    /// Apply a sequence of drag steps. Returns `true` if the order changed.
    pub fn apply_moves(&mut self, moves: &[(usize, usize)]) -> bool {
        let before: Vec<FileId> = self.ids();
        self.files = reorder::apply_moves(&self.files, moves);
        let changed = self.ids() != before;
        if changed {
            tracing::debug!(steps = moves.len(), "collection reordered");
        }
        changed
    }

    /// Replace the order with `order`.
    ///
    /// Ignored unless `order` contains exactly the current ids. Returns
    /// `true` if the new order was applied.
    pub fn reorder(&mut self, order: &[FileId]) -> bool {
        if !reorder::is_permutation(&self.ids(), order) {
            tracing::debug!("ignoring reorder that does not match the current entries");
            return false;
        }

        let mut remaining = std::mem::take(&mut self.files);
        for id in order {
            if let Some(index) = remaining.iter().position(|f| &f.id == id) {
                self.files.push(remaining.swap_remove(index));
            }
        }
        true
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Immutable copy of the current order, handed to a merge.
    pub fn snapshot(&self) -> Vec<PendingFile> {
        self.files.clone()
    }

    /// Ids in current order.
    pub fn ids(&self) -> Vec<FileId> {
        self.files.iter().map(|f| f.id.clone()).collect()
    }

    /// Index of the entry with the given id.
    pub fn position(&self, id: &FileId) -> Option<usize> {
        self.files.iter().position(|f| &f.id == id)
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&PendingFile> {
        self.files.get(index)
    }

    /// Iterate in merge order.
    pub fn iter(&self) -> std::slice::Iter<'_, PendingFile> {
        self.files.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a PendingFile;
    type IntoIter = std::slice::Iter<'a, PendingFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
