//! Per-batch orchestration of PDF extraction.
//!
//! Items are processed strictly one at a time; each item blocks on the
//! external tool before the next begins, and output records are emitted in
//! input order. For every item the flow is: write the PDF payload to a
//! uniquely named temp file, drive the engine, package the result into host
//! records, and delete every temp artifact before the item's processing
//! returns - success or failure.
//!
//! Text mode yields exactly one record per item. Image mode yields one
//! record per extracted image (filesystem listing order, no sorting
//! promise), or a single informational record when the PDF embeds none.

use crate::config::EngineConfig;
use crate::engine::{JavaPdfBox, PdfBoxEngine};
use crate::error::{PdfBoxError, Result};
use crate::temp::{self, TempDir, TempFile};
use crate::types::{
    BinaryData, ErrorPolicy, ExtractionRequest, Operation, OutputRecord, PLAIN_TEXT_MIME_TYPE, TextStats, WorkItem,
};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// The node's batch-execution entry point, generic over the engine so the
/// orchestration logic is testable without a Java runtime.
pub struct PdfBoxNode<E> {
    engine: E,
}

impl PdfBoxNode<JavaPdfBox> {
    /// Node backed by the real subprocess engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: JavaPdfBox::new(config),
        }
    }
}

impl<E: PdfBoxEngine> PdfBoxNode<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Process a batch of work items sequentially.
    ///
    /// Under [`ErrorPolicy::ContinueOnFail`] a failed item becomes an
    /// `{ "error": ... }` record paired to its index and the batch goes on;
    /// under [`ErrorPolicy::Abort`] the first failure is rethrown tagged
    /// with the offending item's index and no further items are processed.
    pub async fn run(
        &self,
        items: &[WorkItem],
        request: &ExtractionRequest,
        policy: ErrorPolicy,
    ) -> Result<Vec<OutputRecord>> {
        let mut records = Vec::new();

        for (item_index, item) in items.iter().enumerate() {
            match self.process_item(item, item_index, request).await {
                Ok(mut produced) => records.append(&mut produced),
                Err(err) => match policy {
                    ErrorPolicy::ContinueOnFail => {
                        tracing::debug!("item {} failed, continuing: {}", item_index, err);
                        records.push(OutputRecord::json_only(
                            json!({ "error": err.to_string() }),
                            item_index,
                        ));
                    }
                    ErrorPolicy::Abort => return Err(err.at_item(item_index)),
                },
            }
        }

        Ok(records)
    }

    async fn process_item(
        &self,
        item: &WorkItem,
        item_index: usize,
        request: &ExtractionRequest,
    ) -> Result<Vec<OutputRecord>> {
        let payload = binary_payload(item, item_index, &request.binary_field)?;

        match request.operation {
            Operation::ExtractText => {
                let record = self.extract_text_item(payload, item_index, request).await?;
                Ok(vec![record])
            }
            Operation::ExtractImages => self.extract_images_item(payload, item_index, request).await,
        }
    }

    async fn extract_text_item(
        &self,
        payload: &BinaryData,
        item_index: usize,
        request: &ExtractionRequest,
    ) -> Result<OutputRecord> {
        let temp_pdf = TempFile::create("input", "pdf", &payload.data).await?;

        // Cleanup must run on both paths before this item returns
        let result = self.text_body(temp_pdf.path(), payload, request).await;
        temp_pdf.cleanup().await;

        result.map(|body| OutputRecord::json_only(body, item_index))
    }

    async fn text_body(
        &self,
        pdf: &Path,
        payload: &BinaryData,
        request: &ExtractionRequest,
    ) -> Result<serde_json::Value> {
        let text = self.engine.extract_text(pdf).await?;

        if text.len() > request.max_buffer {
            return Err(PdfBoxError::validation(format!(
                "extracted text ({} bytes) exceeds the configured output buffer ceiling of {} bytes",
                text.len(),
                request.max_buffer
            )));
        }

        let stats = request.include_stats.then(|| TextStats::measure(&text));

        let mut body = json!({
            "text": text,
            "fileName": payload.file_name.as_deref(),
            "mimeType": PLAIN_TEXT_MIME_TYPE,
            "extractedAt": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(stats) = stats {
            body["stats"] = serde_json::to_value(stats)?;
        }

        Ok(body)
    }

    async fn extract_images_item(
        &self,
        payload: &BinaryData,
        item_index: usize,
        request: &ExtractionRequest,
    ) -> Result<Vec<OutputRecord>> {
        let temp_pdf = TempFile::create("input", "pdf", &payload.data).await?;
        let out_dir = match TempDir::create("images").await {
            Ok(out_dir) => out_dir,
            Err(err) => {
                // Still holding the temp PDF; remove it before bailing
                temp_pdf.cleanup().await;
                return Err(err.into());
            }
        };

        let result = self
            .image_records(temp_pdf.path(), out_dir.path(), item_index, request)
            .await;

        temp_pdf.cleanup().await;
        out_dir.cleanup().await;

        result
    }

    async fn image_records(
        &self,
        pdf: &Path,
        out_dir: &Path,
        item_index: usize,
        request: &ExtractionRequest,
    ) -> Result<Vec<OutputRecord>> {
        let reported = self
            .engine
            .extract_images(pdf, out_dir, &request.image_prefix, request.image_format)
            .await?;
        tracing::debug!("PDFBox reported {} image(s) for item {}", reported, item_index);

        let mut records = Vec::new();
        let mut entries = fs::read_dir(out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let data = fs::read(&path).await?;

            let mut binary = HashMap::new();
            binary.insert(
                request.binary_field.clone(),
                BinaryData {
                    data,
                    file_name: Some(file_name.clone()),
                    mime_type: request.image_format.mime_type().to_string(),
                },
            );
            records.push(OutputRecord {
                json: json!({
                    "fileName": file_name,
                    "format": request.image_format.extension(),
                }),
                binary: Some(binary),
                paired_item: item_index,
            });

            // Packaged; drop the file right away
            temp::remove_quiet(&path).await;
        }

        if records.is_empty() {
            return Ok(vec![OutputRecord::json_only(
                json!({ "message": "No images found in PDF", "imagesFound": 0 }),
                item_index,
            )]);
        }

        Ok(records)
    }
}

fn binary_payload<'a>(item: &'a WorkItem, item_index: usize, field: &str) -> Result<&'a BinaryData> {
    let binary = item
        .binary
        .as_ref()
        .filter(|map| !map.is_empty())
        .ok_or_else(|| PdfBoxError::missing_binary_data(item_index, "no binary data exists on item"))?;

    binary.get(field).ok_or_else(|| {
        PdfBoxError::missing_binary_data(item_index, format!("binary field \"{field}\" does not exist on item"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PDF_MIME_TYPE;

    fn pdf_item() -> WorkItem {
        WorkItem::with_binary(
            "data",
            BinaryData {
                data: b"%PDF-1.4 fake".to_vec(),
                file_name: Some("doc.pdf".to_string()),
                mime_type: PDF_MIME_TYPE.to_string(),
            },
        )
    }

    #[test]
    fn test_binary_payload_missing_binary_map() {
        let item = WorkItem::default();
        let err = binary_payload(&item, 0, "data").unwrap_err();
        assert!(matches!(err, PdfBoxError::MissingBinaryData { item_index: 0, .. }));
        assert!(err.to_string().contains("no binary data"));
    }

    #[test]
    fn test_binary_payload_missing_field_names_it() {
        let item = pdf_item();
        let err = binary_payload(&item, 2, "attachment").unwrap_err();
        assert!(matches!(err, PdfBoxError::MissingBinaryData { item_index: 2, .. }));
        assert!(err.to_string().contains("\"attachment\""));
    }

    #[test]
    fn test_binary_payload_found() {
        let item = pdf_item();
        let payload = binary_payload(&item, 0, "data").unwrap();
        assert_eq!(payload.file_name.as_deref(), Some("doc.pdf"));
    }
}
