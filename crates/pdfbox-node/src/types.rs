//! Data model shared between the orchestrator and the host platform.
//!
//! Work items and output records mirror the host platform's item shape: a
//! JSON body plus an optional map of named binary payloads, correlated by
//! item index (`paired_item`). Nothing here is persisted; records are handed
//! straight back to the host after each batch.

use crate::error::{PdfBoxError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// MIME type attached to the temp PDF written per item.
pub const PDF_MIME_TYPE: &str = "application/pdf";
/// MIME type reported on text-mode output records.
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";

/// Default binary field name on work items.
pub const DEFAULT_BINARY_FIELD: &str = "data";
/// Default ceiling on extracted text size, in bytes.
pub const DEFAULT_MAX_BUFFER: usize = 16 * 1024 * 1024;
/// Default filename prefix for extracted images.
pub const DEFAULT_IMAGE_PREFIX: &str = "image";

/// A named binary payload on a work item: raw bytes plus file metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryData {
    pub data: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub mime_type: String,
}

/// One unit of input flowing through the host platform's pipeline.
///
/// Owned by the host; read-only to this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<HashMap<String, BinaryData>>,
}

impl WorkItem {
    /// Build an item carrying a single binary payload under `field`.
    pub fn with_binary(field: impl Into<String>, data: BinaryData) -> Self {
        let mut binary = HashMap::new();
        binary.insert(field.into(), data);
        Self {
            json: Value::Null,
            binary: Some(binary),
        }
    }

    pub fn binary_field(&self, name: &str) -> Option<&BinaryData> {
        self.binary.as_ref().and_then(|map| map.get(name))
    }
}

/// One unit of output matching the host platform's item shape.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<HashMap<String, BinaryData>>,
    /// Index of the originating work item, for result pairing.
    pub paired_item: usize,
}

impl OutputRecord {
    /// A record with a JSON body only, no binary payload.
    pub fn json_only(json: Value, paired_item: usize) -> Self {
        Self {
            json,
            binary: None,
            paired_item,
        }
    }
}

/// Requested operation for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ExtractText,
    ExtractImages,
}

/// Output format for extracted images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
}

impl ImageFormat {
    /// File extension without the leading dot, as passed to the tool's
    /// `-format` argument.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg => "image/jpeg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = PdfBoxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "png" => Ok(ImageFormat::Png),
            "jpg" => Ok(ImageFormat::Jpg),
            other => Err(PdfBoxError::validation(format!(
                "unsupported image format '{other}' (expected 'png' or 'jpg')"
            ))),
        }
    }
}

/// Per-item extraction parameters, resolved from the host's node
/// configuration. Constructed fresh per item; immutable once built.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub operation: Operation,
    /// Name of the binary field holding the PDF bytes; extracted images are
    /// emitted under the same field name.
    pub binary_field: String,
    /// Attach a [`TextStats`] block to text-mode records.
    pub include_stats: bool,
    /// Ceiling on extracted text size in bytes. Output over the ceiling is
    /// an error, never a truncation.
    pub max_buffer: usize,
    pub image_prefix: String,
    pub image_format: ImageFormat,
}

impl ExtractionRequest {
    pub fn text(binary_field: impl Into<String>) -> Self {
        Self {
            operation: Operation::ExtractText,
            binary_field: binary_field.into(),
            ..Self::default()
        }
    }

    pub fn images(binary_field: impl Into<String>, format: ImageFormat) -> Self {
        Self {
            operation: Operation::ExtractImages,
            binary_field: binary_field.into(),
            image_format: format,
            ..Self::default()
        }
    }
}

impl Default for ExtractionRequest {
    fn default() -> Self {
        Self {
            operation: Operation::ExtractText,
            binary_field: DEFAULT_BINARY_FIELD.to_string(),
            include_stats: false,
            max_buffer: DEFAULT_MAX_BUFFER,
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            image_format: ImageFormat::Png,
        }
    }
}

/// What to do when one item's processing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Emit an `{ "error": ... }` record for the failed item and keep going.
    ContinueOnFail,
    /// Abort the batch with an error tagged with the failing item's index.
    Abort,
}

/// Summary statistics over extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    /// `1 +` the number of newline characters.
    pub lines: usize,
    /// Whitespace-delimited non-empty tokens.
    pub words: usize,
    pub characters: usize,
    /// Byte size in KB, rounded to the nearest whole KB.
    pub size_kb: u64,
}

impl TextStats {
    pub fn measure(text: &str) -> Self {
        Self {
            lines: 1 + text.matches('\n').count(),
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
            size_kb: ((text.len() as f64) / 1024.0).round() as u64,
        }
    }
}
