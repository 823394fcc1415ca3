//! Saving a merged document to disk.
//!
//! Writes are atomic by default: the bytes go to a uniquely named temp file
//! in the destination's directory which is then renamed over the
//! destination. A failed save leaves neither a truncated PDF nor the temp
//! file behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;

use crate::error::{PdfStackError, Result};
use crate::utils::format_file_size;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Number of bytes written.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes artifact bytes to the filesystem.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    atomic: bool,
    buffer_size: usize,
}

impl ArtifactWriter {
    /// Create a writer using atomic writes.
    pub fn new() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }

    /// Create a writer that writes the destination in place.
    pub fn non_atomic() -> Self {
        Self {
            atomic: false,
            ..Self::new()
        }
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::FailedToWrite`] if the file cannot be
    /// created, written, flushed or renamed into place.
    pub async fn save(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let atomic = self.atomic;
        let buffer_size = self.buffer_size;
        let bytes = bytes.to_vec();

        task::spawn_blocking(move || {
            let start = Instant::now();

            if atomic {
                let dir = match path_buf.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => Path::new("."),
                };
                // Removed on drop, so every early return cleans up.
                let temp = tempfile::Builder::new()
                    .prefix(".pdfstack-")
                    .suffix(".tmp")
                    .tempfile_in(dir)
                    .map_err(|e| failed(dir, e))?;
                write_buffered(temp.as_file(), &bytes, buffer_size)
                    .map_err(|e| failed(temp.path(), e))?;
                persist(temp, &path_buf)?;
            } else {
                let file = File::create(&path_buf).map_err(|e| failed(&path_buf, e))?;
                write_buffered(&file, &bytes, buffer_size).map_err(|e| failed(&path_buf, e))?;
            }

            Ok::<_, PdfStackError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PdfStackError::Io {
            source: std::io::Error::other(format!("Write task failed: {e}")),
        })?
    }
}

fn failed(path: &Path, source: std::io::Error) -> PdfStackError {
    PdfStackError::FailedToWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn write_buffered(file: &File, bytes: &[u8], buffer_size: usize) -> std::io::Result<()> {
    let mut writer = BufWriter::with_capacity(buffer_size, file);
    writer.write_all(bytes)?;
    writer.flush()
}

/// Rename the temp file over `path`. On failure the temp file is deleted.
fn persist(temp: NamedTempFile, path: &Path) -> Result<()> {
    temp.persist(path)
        .map(|_| ())
        .map_err(|e| failed(path, e.error))
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new()
    }
}
