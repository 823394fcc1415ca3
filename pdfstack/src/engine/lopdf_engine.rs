//! `lopdf`-backed engine.
//!
//! Copying works on a clone of the source document: its objects are
//! renumbered above the accumulator's highest id, attributes the pages
//! inherit from their page tree are pushed down onto the pages, and every
//! object except the source catalog and page tree nodes moves into the
//! accumulator. Appending rewires each page's `Parent` to the accumulator's
//! page tree root.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::HashSet;

use super::{LoadError, PdfEngine};
use crate::config::CompressionLevel;
use crate::error::{PdfStackError, Result};

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on page tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Document under construction plus its page tree root.
#[derive(Debug)]
pub struct LopdfAccumulator {
    document: Document,
    pages_id: ObjectId,
}

/// PDF engine built on `lopdf`.
#[derive(Debug, Clone)]
pub struct LopdfEngine {
    compression: CompressionLevel,
    verify_pages: bool,
}

impl LopdfEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self {
            compression: CompressionLevel::default(),
            verify_pages: true,
        }
    }

    /// Set the compression applied on serialization.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Accept documents that have no pages.
    pub fn without_verification(mut self) -> Self {
        self.verify_pages = false;
        self
    }

    /// Append page references to the accumulator's `Kids` array.
    fn add_pages_to_tree(&self, accumulator: &mut LopdfAccumulator, page_ids: &[ObjectId]) -> Result<()> {
        let pages_dict = accumulator
            .document
            .get_object_mut(accumulator.pages_id)
            .map_err(|e| PdfStackError::engine(format!("Failed to get pages object: {e}")))?;

        let Object::Dictionary(dict) = pages_dict else {
            return Err(PdfStackError::engine("Pages object is not a dictionary"));
        };

        let kids = dict
            .get_mut(b"Kids")
            .map_err(|_| PdfStackError::engine("Pages dictionary missing Kids array"))?;

        let Object::Array(kids_array) = kids else {
            return Err(PdfStackError::engine("Kids is not an array"));
        };

        kids_array.extend(page_ids.iter().map(|&id| Object::Reference(id)));

        let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
        dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));

        Ok(())
    }
}

impl Default for LopdfEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfEngine for LopdfEngine {
    type Accumulator = LopdfAccumulator;
    type Document = Document;
    type Page = ObjectId;

    fn create_accumulator(&self) -> Result<LopdfAccumulator> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Ok(LopdfAccumulator { document, pages_id })
    }

    async fn load_document(&self, bytes: Vec<u8>) -> std::result::Result<Document, LoadError> {
        let verify = self.verify_pages;

        // Parsing is CPU bound; keep it off the async workers.
        let document = tokio::task::spawn_blocking(move || Document::load_mem(&bytes))
            .await
            .map_err(|e| LoadError::new(format!("Load task failed: {e}")))?
            .map_err(|e| LoadError::new(e.to_string()))?;

        if verify && document.get_pages().is_empty() {
            return Err(LoadError::new("PDF has no pages"));
        }

        Ok(document)
    }

    fn page_indices(&self, document: &Document) -> Vec<usize> {
        (0..document.get_pages().len()).collect()
    }

    fn copy_pages(
        &self,
        accumulator: &mut LopdfAccumulator,
        document: &Document,
        indices: &[usize],
    ) -> Result<Vec<ObjectId>> {
        let mut source = document.clone();
        source.renumber_objects_with(accumulator.document.max_id + 1);
        accumulator.document.max_id = accumulator.document.max_id.max(source.max_id);

        // BTreeMap keyed by 1-based page number, so values are in page order.
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

        let mut copied = Vec::with_capacity(indices.len());
        for &index in indices {
            let page_id = *page_ids.get(index).ok_or_else(|| {
                PdfStackError::engine(format!(
                    "Page index {index} out of range ({} pages)",
                    page_ids.len()
                ))
            })?;
            flatten_inherited_attributes(&mut source, page_id)?;
            copied.push(page_id);
        }

        let skipped = page_tree_nodes(&source);
        for (id, object) in source.objects {
            if !skipped.contains(&id) {
                accumulator.document.objects.insert(id, object);
            }
        }

        Ok(copied)
    }

    fn append_pages(&self, accumulator: &mut LopdfAccumulator, pages: Vec<ObjectId>) -> Result<()> {
        for &page_id in &pages {
            let page = accumulator
                .document
                .get_object_mut(page_id)
                .map_err(|e| PdfStackError::engine(format!("Failed to get page: {e}")))?;

            match page {
                Object::Dictionary(dict) => dict.set("Parent", accumulator.pages_id),
                _ => return Err(PdfStackError::engine("Page object is not a dictionary")),
            }
        }

        self.add_pages_to_tree(accumulator, &pages)
    }

    fn page_count(&self, accumulator: &LopdfAccumulator) -> usize {
        accumulator.document.get_pages().len()
    }

    fn serialize(&self, accumulator: LopdfAccumulator) -> Result<Vec<u8>> {
        let mut document = accumulator.document;

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => document.compress(),
            CompressionLevel::Maximum => {
                document.compress();
                document.prune_objects();
            }
        }

        document.renumber_objects();

        let mut buffer = Vec::new();
        document
            .save_to(&mut buffer)
            .map_err(|e| PdfStackError::engine(format!("Failed to serialize document: {e}")))?;
        Ok(buffer)
    }
}

/// Copy inheritable attributes from the page's ancestors onto the page.
fn flatten_inherited_attributes(document: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = document
        .get_dictionary(page_id)
        .map_err(|e| PdfStackError::engine(format!("Failed to get page: {e}")))?;

    let inherited: Vec<(&[u8], Object)> = INHERITABLE_KEYS
        .iter()
        .filter(|key| !page.has(key))
        .filter_map(|&key| inherited_attribute(document, page, key).map(|value| (key, value)))
        .collect();

    if inherited.is_empty() {
        return Ok(());
    }

    if let Ok(Object::Dictionary(dict)) = document.get_object_mut(page_id) {
        for (key, value) in inherited {
            dict.set(key.to_vec(), value);
        }
    }

    Ok(())
}

/// Walk up the page tree looking for `key`.
fn inherited_attribute(document: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = document.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    None
}

/// Ids of the catalog and every `Pages` node; these never move into an
/// accumulator.
fn page_tree_nodes(document: &Document) -> HashSet<ObjectId> {
    let mut nodes: HashSet<ObjectId> = document
        .objects
        .iter()
        .filter_map(|(&id, object)| {
            let dict = object.as_dict().ok()?;
            let is_pages = dict
                .get(b"Type")
                .and_then(|t| t.as_name())
                .map(|name| name == b"Pages")
                .unwrap_or(false);
            is_pages.then_some(id)
        })
        .collect();

    if let Ok(root) = document.trailer.get(b"Root").and_then(|r| r.as_reference()) {
        nodes.insert(root);
    }

    nodes
}
