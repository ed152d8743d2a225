//! Subprocess-facing adapter for the Apache PDFBox command-line tool.
//!
//! [`PdfBoxEngine`] is the narrow interface the orchestrator drives, so
//! batch logic can be tested against a fake without spawning a real process.
//! [`JavaPdfBox`] is the production implementation: it shells out to
//! `java -jar pdfbox.jar` and interprets the exit-code contract (0 success,
//! anything else failure with details on stderr only).
//!
//! Text extraction directs the tool's output to a secondary temp file rather
//! than the tool's own stdout; writing to a console triggers encoding
//! warnings on some platforms, and it keeps stdout of any calling driver
//! process reserved for the extracted text itself.

use crate::config::{EngineConfig, java_install_message};
use crate::error::{PdfBoxError, Result};
use crate::temp::{self, TempFile};
use crate::types::ImageFormat;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;

/// Narrow interface over the external extraction tool.
#[async_trait]
pub trait PdfBoxEngine: Send + Sync {
    /// Extract the full text of the PDF at `pdf`.
    async fn extract_text(&self, pdf: &Path) -> Result<String>;

    /// Extract embedded images from `pdf` into `out_dir`, naming files with
    /// `prefix` and encoding them as `format`. Returns the number of files
    /// with the requested format's extension present in `out_dir` afterwards.
    async fn extract_images(
        &self,
        pdf: &Path,
        out_dir: &Path,
        prefix: &str,
        format: ImageFormat,
    ) -> Result<usize>;
}

/// Production engine invoking `java -jar pdfbox.jar` as a subprocess.
pub struct JavaPdfBox {
    config: EngineConfig,
}

impl JavaPdfBox {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn tool_command(&self) -> Command {
        let mut command = Command::new(&self.config.java_path);
        command.arg("-jar").arg(&self.config.jar_path);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);
        command
    }

    /// Spawn the tool, wait for exit (with the configured deadline, if any)
    /// and enforce the exit-code contract. The tool's stdout is ignored;
    /// stderr is diagnostics only and is surfaced solely on failure.
    async fn run(&self, mut command: Command) -> Result<()> {
        tracing::debug!("invoking PDFBox: {:?}", command.as_std());

        let child = command.spawn().map_err(|e| {
            PdfBoxError::MissingDependency(format!(
                "failed to launch '{}': {}. {}",
                self.config.java_path.display(),
                e,
                java_install_message()
            ))
        })?;

        let output = match self.config.timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    // Deadline expired; dropping the cancelled wait kills the
                    // child (kill_on_drop). Temp guards still run.
                    return Err(PdfBoxError::Timeout {
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PdfBoxError::Subprocess {
                exit_code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(())
    }

    async fn text_via_scratch(&self, pdf: &Path, out: &Path) -> Result<String> {
        let mut command = self.tool_command();
        command
            .arg("export:text")
            .arg("-i")
            .arg(pdf)
            .arg("-o")
            .arg(out)
            .arg("-encoding")
            .arg("UTF-8");

        self.run(command).await?;

        let text = fs::read_to_string(out).await.map_err(|e| {
            PdfBoxError::validation_with_source(
                format!(
                    "PDFBox reported success but its text output at '{}' could not be read",
                    out.display()
                ),
                e,
            )
        })?;

        tracing::debug!("extracted {} bytes of text from {}", text.len(), pdf.display());
        Ok(text)
    }
}

#[async_trait]
impl PdfBoxEngine for JavaPdfBox {
    async fn extract_text(&self, pdf: &Path) -> Result<String> {
        // The tool writes here; guard the path before the run so a failure
        // after partial output still removes it.
        let out_guard = TempFile::adopt(temp::scratch_path("text", "txt"));

        // Cleanup must complete before returning, on success and failure alike
        let result = self.text_via_scratch(pdf, out_guard.path()).await;
        out_guard.cleanup().await;
        result
    }

    async fn extract_images(
        &self,
        pdf: &Path,
        out_dir: &Path,
        prefix: &str,
        format: ImageFormat,
    ) -> Result<usize> {
        fs::create_dir_all(out_dir).await?;

        let mut command = self.tool_command();
        command
            .arg("export:images")
            .arg("-i")
            .arg(pdf)
            .arg("-o")
            .arg(out_dir)
            .arg("-prefix")
            .arg(prefix)
            .arg("-format")
            .arg(format.extension());

        self.run(command).await?;

        let mut produced = 0usize;
        let mut entries = fs::read_dir(out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(format.extension()) {
                produced += 1;
            }
        }

        tracing::debug!("PDFBox produced {} {} file(s) from {}", produced, format.extension(), pdf.display());
        Ok(produced)
    }
}
