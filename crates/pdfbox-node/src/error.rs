//! Error types for pdfbox-node.
//!
//! All fallible operations return [`Result`], backed by [`PdfBoxError`].
//! The taxonomy follows the failure classes of subprocess orchestration:
//!
//! - `Io` - file system errors, always bubble up unchanged
//! - `MissingBinaryData` - a work item lacks the requested binary payload
//! - `Subprocess` - the PDFBox tool ran but exited nonzero
//! - `MissingDependency` - java or the PDFBox jar could not be launched at all
//! - `Timeout` - a caller-supplied deadline expired and the tool was killed
//! - `Validation` - bad parameters or output violating a configured limit
//!
//! Temp-artifact cleanup failures are deliberately *not* part of this
//! taxonomy: cleanup is best-effort, logged at debug level, and never
//! replaces the error (if any) of the operation it follows.
use thiserror::Error;

/// Result type alias using `PdfBoxError`.
pub type Result<T> = std::result::Result<T, PdfBoxError>;

/// Main error type for all pdfbox-node operations.
#[derive(Debug, Error)]
pub enum PdfBoxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("item {item_index}: {message}")]
    MissingBinaryData { item_index: usize, message: String },

    /// The external tool exited nonzero. The message leads with the exit
    /// code and embeds the captured diagnostic stream verbatim.
    #[error("PDFBox failed with code {exit_code}: {stderr}")]
    Subprocess { exit_code: i32, stderr: String },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("PDFBox did not finish within {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Batch-fatal wrapper tagging the originating work item, produced when
    /// the batch is configured to abort on the first failure.
    #[error("item {item_index} failed: {source}")]
    Item {
        item_index: usize,
        #[source]
        source: Box<PdfBoxError>,
    },
}

impl PdfBoxError {
    /// Create a Validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Validation error with source
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a MissingBinaryData error for the given item.
    pub fn missing_binary_data<S: Into<String>>(item_index: usize, message: S) -> Self {
        Self::MissingBinaryData {
            item_index,
            message: message.into(),
        }
    }

    /// Wrap this error as batch-fatal, tagged with the offending item index.
    pub fn at_item(self, item_index: usize) -> Self {
        Self::Item {
            item_index,
            source: Box::new(self),
        }
    }
}
