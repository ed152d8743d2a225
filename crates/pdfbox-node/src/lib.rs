//! pdfbox-node - PDF text and image extraction for workflow-automation hosts.
//!
//! This crate is a process-orchestration shim: the actual extraction work is
//! delegated to the Apache PDFBox command-line tool, invoked as a `java`
//! subprocess. What lives here is the part with real invariants - parameter
//! marshalling, unique temp-file naming, cleanup on every exit path, exit
//! code interpretation, and packaging results into the host platform's
//! item-based data model.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pdfbox_node::{
//!     BinaryData, EngineConfig, ErrorPolicy, ExtractionRequest, PdfBoxNode, WorkItem,
//! };
//!
//! # async fn example() -> pdfbox_node::Result<()> {
//! let node = PdfBoxNode::new(EngineConfig::from_env());
//! let items = vec![WorkItem::with_binary(
//!     "data",
//!     BinaryData {
//!         data: std::fs::read("document.pdf")?,
//!         file_name: Some("document.pdf".into()),
//!         mime_type: pdfbox_node::PDF_MIME_TYPE.into(),
//!     },
//! )];
//! let records = node
//!     .run(&items, &ExtractionRequest::text("data"), ErrorPolicy::ContinueOnFail)
//!     .await?;
//! println!("{}", records[0].json["text"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`node`]: per-batch orchestrator - sequential item loop, temp-file
//!   lifecycle, error policy
//! - [`engine`]: the [`engine::PdfBoxEngine`] trait and the `java -jar`
//!   subprocess implementation
//! - [`temp`]: random-suffix scratch naming and RAII cleanup guards
//! - [`config`]: java/jar discovery and the availability probe
//!
//! The companion `pdfbox-driver` binary exposes the same engine behind the
//! command-line contract host deployments invoke directly.

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod temp;
pub mod types;

pub use config::{EngineConfig, check_pdfbox_available};
pub use engine::{JavaPdfBox, PdfBoxEngine};
pub use error::{PdfBoxError, Result};
pub use node::PdfBoxNode;
pub use types::{
    BinaryData, DEFAULT_BINARY_FIELD, DEFAULT_IMAGE_PREFIX, DEFAULT_MAX_BUFFER, ErrorPolicy, ExtractionRequest,
    ImageFormat, Operation, OutputRecord, PDF_MIME_TYPE, PLAIN_TEXT_MIME_TYPE, TextStats, WorkItem,
};
