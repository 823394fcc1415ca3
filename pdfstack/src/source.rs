//! File sources: where pending documents come from.
//!
//! A file picker, a drag-and-drop target or a shell glob all yield the same
//! thing, a sequence of raw entries that know their declared content type,
//! name, modification time and size, and that can read their bytes later.
//! Nothing is read until a merge actually needs the content.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::error::{PdfStackError, Result};

/// MIME type accepted by the collection.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Content type reported for anything that is not recognisably a PDF.
pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// A raw file entry as handed over by a picker or drop target.
pub trait FileSource: Send + Sync + fmt::Debug {
    /// File name, without directories.
    fn name(&self) -> &str;

    /// Declared MIME type.
    fn content_type(&self) -> &str;

    /// Last modification time in milliseconds since the Unix epoch.
    fn last_modified(&self) -> i64;

    /// Size in bytes.
    fn size(&self) -> u64;

    /// Read the whole content.
    fn read_bytes(&self) -> BoxFuture<'_, io::Result<Vec<u8>>>;
}

/// Shared handle to a file source.
pub type SourceHandle = Arc<dyn FileSource>;

/// Guess a content type from a path's extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_CONTENT_TYPE,
        _ => OCTET_STREAM_CONTENT_TYPE,
    }
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    content_type: &'static str,
    last_modified: i64,
    size: u64,
}

impl DiskFile {
    /// Stat a file and capture the attributes its identity is derived from.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::FileRead`] if the file cannot be inspected.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| PdfStackError::file_read(name.clone(), e))?;

        if !metadata.is_file() {
            return Err(PdfStackError::file_read(
                name,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();

        Ok(Self {
            content_type: content_type_for_path(&path),
            path,
            name,
            last_modified,
            size: metadata.len(),
        })
    }

    /// Path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        self.content_type
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_bytes(&self) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        tokio::fs::read(&self.path).boxed()
    }
}

/// A file whose content is already in memory (drops, uploads, tests).
#[derive(Clone)]
pub struct MemoryFile {
    name: String,
    content_type: String,
    last_modified: i64,
    bytes: Arc<[u8]>,
}

impl MemoryFile {
    /// Create an in-memory entry with an explicit content type.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        last_modified: i64,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            last_modified,
            bytes: bytes.into(),
        }
    }

    /// Create an in-memory entry declared as `application/pdf`.
    pub fn pdf(name: impl Into<String>, last_modified: i64, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(name, PDF_CONTENT_TYPE, last_modified, bytes)
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("last_modified", &self.last_modified)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_bytes(&self) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        let bytes = self.bytes.to_vec();
        async move { Ok(bytes) }.boxed()
    }
}

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.
/// `&[&str]` or `Vec<String>`. Matches of each pattern are returned in the
/// glob walker's order, patterns in the order given. A pattern without
/// wildcards is returned as is, whether or not it exists, so opening it
/// reports a missing file instead of silently matching nothing.
///
/// # Errors
///
/// Propagates glob parse errors and filesystem errors from the walker.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !pattern.contains(['*', '?', '[']) {
            resolved_paths.push(PathBuf::from(pattern));
            continue;
        }
        for entry in glob::glob(pattern)? {
            resolved_paths.push(entry?);
        }
    }

    Ok(resolved_paths)
}

/// Open every path as a [`DiskFile`], preserving order.
///
/// # Errors
///
/// Fails on the first path that cannot be inspected.
pub async fn open_paths(paths: &[PathBuf]) -> Result<Vec<SourceHandle>> {
    let mut sources: Vec<SourceHandle> = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(Arc::new(DiskFile::open(path).await?));
    }
    Ok(sources)
}
