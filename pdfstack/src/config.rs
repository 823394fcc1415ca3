//! Configuration for collection and merge behavior.
//!
//! A [`MergeConfig`] is built from defaults, an optional JSON document, and
//! finally presentation-layer overrides (CLI flags). It is validated once
//! before it is handed to a [`MergeSession`](crate::session::MergeSession).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PdfStackError, Result};

/// Default user-facing message stored in the failed merge state.
pub const DEFAULT_FAILURE_MESSAGE: &str =
    "An error occurred while merging PDFs. Please check if the files are valid and not corrupted.";

/// Default file name suggested when saving the merged document.
pub const DEFAULT_ARTIFACT_NAME: &str = "merged-document.pdf";

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfStackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfStackError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Settings that drive a [`MergeSession`](crate::session::MergeSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergeConfig {
    /// Cosmetic pause after each file. Zero disables pacing.
    #[serde(with = "duration_millis")]
    pub step_delay: Duration,

    /// Compression applied when serializing the merged document.
    pub compression: CompressionLevel,

    /// Minimum number of files the session requires before merging.
    pub min_files: usize,

    /// Treat documents without pages as load errors.
    pub verify_pages: bool,

    /// File name suggested when saving the merged document.
    pub artifact_name: String,

    /// Message stored in the failed state, shown to the user.
    pub failure_message: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::ZERO,
            compression: CompressionLevel::default(),
            min_files: 2,
            verify_pages: true,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl MergeConfig {
    /// Parse a configuration document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidConfig`] if the document is not valid
    /// JSON or fails [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfstack::config::{CompressionLevel, MergeConfig};
    ///
    /// let config = MergeConfig::from_json_str(r#"{ "compression": "maximum", "stepDelay": 250 }"#).unwrap();
    /// assert_eq!(config.compression, CompressionLevel::Maximum);
    /// assert_eq!(config.step_delay.as_millis(), 250);
    /// assert_eq!(config.min_files, 2);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PdfStackError::invalid_config(format!("Malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `min_files` is zero
    /// - `artifact_name` is blank
    /// - `failure_message` is blank
    pub fn validate(&self) -> Result<()> {
        if self.min_files == 0 {
            return Err(PdfStackError::invalid_config(
                "Minimum file count must be at least 1",
            ));
        }

        if self.artifact_name.trim().is_empty() {
            return Err(PdfStackError::invalid_config("Artifact name cannot be empty"));
        }

        if self.failure_message.trim().is_empty() {
            return Err(PdfStackError::invalid_config(
                "Failure message cannot be empty",
            ));
        }

        Ok(())
    }

    /// Set the per-file pause.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Set the output compression.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
