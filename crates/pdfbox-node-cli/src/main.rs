//! `pdfbox-driver` - command-line adapter over the PDFBox extraction engine.
//!
//! Invoked by the orchestrating host, not by end users:
//!
//! ```text
//! pdfbox-driver <pdf-path>                                      # text to stdout
//! pdfbox-driver extractImages <pdf-path> <out-dir> [prefix] [format]
//! ```
//!
//! stdout is reserved exclusively for the payload (extracted text, or the
//! image count); every diagnostic goes to stderr. Exit code 0 on success,
//! 1 on any failure with the failure detail on stderr.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use pdfbox_node::{EngineConfig, ImageFormat, JavaPdfBox, PdfBoxEngine, check_pdfbox_available};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pdfbox-driver",
    version,
    about = "Extract text and images from PDF files via Apache PDFBox",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the PDF to extract text from
    pdf: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract embedded images into a directory and print the count
    #[command(name = "extractImages")]
    ExtractImages {
        /// Path to the PDF
        pdf: PathBuf,
        /// Directory to write image files into (created if absent)
        out_dir: PathBuf,
        /// Filename prefix for extracted images
        #[arg(default_value = "image")]
        prefix: String,
        /// Image format: png or jpg
        #[arg(default_value = "png")]
        format: String,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Path to the PDFBox jar (overrides discovery)
    #[arg(long)]
    jar: Option<PathBuf>,

    /// Path to the java executable (overrides discovery)
    #[arg(long)]
    java: Option<PathBuf>,

    /// Kill the PDFBox process if it runs longer than this many seconds
    #[arg(long)]
    timeout_seconds: Option<u64>,
}

impl EngineArgs {
    fn into_config(self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(jar) = self.jar {
            config.jar_path = jar;
        }
        if let Some(java) = self.java {
            config.java_path = java;
        }
        if let Some(seconds) = self.timeout_seconds {
            config.timeout = Some(Duration::from_secs(seconds));
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics to stderr only; stdout carries the extraction payload
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // The host treats any nonzero exit as failure; clap's usage errors exit
    // with 2 by default, so map them to 1 (help and version still exit 0).
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            err.print().context("rendering argument error")?;
            std::process::exit(code);
        }
    };

    match cli.command {
        Some(Command::ExtractImages {
            pdf,
            out_dir,
            prefix,
            format,
            engine,
        }) => {
            let format: ImageFormat = format.parse()?;
            let config = engine.into_config();
            check_pdfbox_available(&config).await?;

            let engine = JavaPdfBox::new(config);
            let count = engine.extract_images(&pdf, &out_dir, &prefix, format).await?;
            tracing::debug!("extracted {} image(s) into {}", count, out_dir.display());
            println!("{count}");
        }
        None => {
            let Some(pdf) = cli.pdf else {
                bail!(
                    "usage: pdfbox-driver <pdf-path>\n   or: pdfbox-driver extractImages <pdf-path> <out-dir> [prefix] [format]"
                );
            };
            let config = cli.engine.into_config();
            check_pdfbox_available(&config).await?;

            let engine = JavaPdfBox::new(config);
            let text = engine.extract_text(&pdf).await?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("writing extracted text to stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_text_mode_positional() {
        let cli = Cli::try_parse_from(["pdfbox-driver", "input.pdf"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.pdf, Some(PathBuf::from("input.pdf")));
    }

    #[test]
    fn test_cli_parses_extract_images_with_defaults() {
        let cli = Cli::try_parse_from(["pdfbox-driver", "extractImages", "input.pdf", "/tmp/out"]).unwrap();
        match cli.command {
            Some(Command::ExtractImages {
                pdf,
                out_dir,
                prefix,
                format,
                ..
            }) => {
                assert_eq!(pdf, PathBuf::from("input.pdf"));
                assert_eq!(out_dir, PathBuf::from("/tmp/out"));
                assert_eq!(prefix, "image");
                assert_eq!(format, "png");
            }
            other => panic!("expected extractImages, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_extract_images_with_prefix_and_format() {
        let cli =
            Cli::try_parse_from(["pdfbox-driver", "extractImages", "a.pdf", "/tmp/out", "page", "jpg"]).unwrap();
        match cli.command {
            Some(Command::ExtractImages { prefix, format, .. }) => {
                assert_eq!(prefix, "page");
                assert_eq!(format, "jpg");
            }
            other => panic!("expected extractImages, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_missing_image_args() {
        assert!(Cli::try_parse_from(["pdfbox-driver", "extractImages", "a.pdf"]).is_err());
    }

    #[test]
    fn test_engine_args_override_config() {
        let args = EngineArgs {
            jar: Some(PathBuf::from("/opt/pdfbox.jar")),
            java: Some(PathBuf::from("/opt/java")),
            timeout_seconds: Some(45),
        };
        let config = args.into_config();
        assert_eq!(config.jar_path, PathBuf::from("/opt/pdfbox.jar"));
        assert_eq!(config.java_path, PathBuf::from("/opt/java"));
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_cli_accepts_no_args_at_parse_time() {
        // Missing PDF is reported at run time with a usage message, exit 1
        let cli = Cli::try_parse_from(["pdfbox-driver"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.pdf.is_none());
    }
}
