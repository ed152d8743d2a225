//! Engine configuration and external-tool discovery.
//!
//! The PDFBox command-line tool ships as a jar and needs a Java 17+ runtime;
//! both are deployment preconditions, not something this crate provisions.
//! Discovery checks environment overrides first, then the conventional
//! install location, then `PATH`.

use crate::error::{PdfBoxError, Result};
use std::collections::HashSet;
use std::env;
use std::fs as std_fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Env var overriding the java executable path.
pub const JAVA_PATH_ENV: &str = "PDFBOX_NODE_JAVA_PATH";
/// Env var overriding the PDFBox jar path.
pub const JAR_PATH_ENV: &str = "PDFBOX_NODE_JAR_PATH";
/// Conventional jar install location on deployment hosts.
pub const DEFAULT_JAR_PATH: &str = "/usr/local/lib/pdfbox/pdfbox.jar";

/// How to invoke the external PDFBox tool.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub java_path: PathBuf,
    pub jar_path: PathBuf,
    /// Deadline for one tool invocation. `None` means wait indefinitely,
    /// matching the original behavior; callers that cannot afford a hung
    /// batch should set one.
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            java_path: PathBuf::from("java"),
            jar_path: PathBuf::from(DEFAULT_JAR_PATH),
            timeout: None,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment overrides and `PATH` discovery,
    /// falling back to `java` and the conventional jar location.
    pub fn from_env() -> Self {
        Self {
            java_path: locate_java().unwrap_or_else(|| PathBuf::from("java")),
            jar_path: env::var_os(JAR_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_JAR_PATH)),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub(crate) fn java_install_message() -> String {
    format!(
        "A Java 17+ runtime and the Apache PDFBox command-line jar are required. \
Install Java (e.g. 'apt install openjdk-17-jre-headless') and place the jar at {DEFAULT_JAR_PATH}, \
or point {JAVA_PATH_ENV} / {JAR_PATH_ENV} at custom locations."
    )
}

fn java_candidates() -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    if let Some(value) = env::var_os(JAVA_PATH_ENV).filter(|v| !v.is_empty()) {
        push_candidate(PathBuf::from(value));
    }

    if let Some(home) = env::var_os("JAVA_HOME").filter(|v| !v.is_empty()) {
        let home = PathBuf::from(home);
        push_candidate(home.join("bin/java"));
        push_candidate(home.join("bin/java.exe"));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("java"));
            push_candidate(dir.join("java.exe"));
        }
    }

    candidates
}

/// Find an existing java executable, if any.
pub fn locate_java() -> Option<PathBuf> {
    java_candidates().into_iter().find(|candidate| {
        candidate.exists()
            && std_fs::metadata(candidate)
                .map(|metadata| metadata.is_file())
                .unwrap_or(false)
    })
}

/// Probe that the configured java runtime answers `-version` and that the
/// jar exists. Maps every failure to `MissingDependency` with install help.
pub async fn check_pdfbox_available(config: &EngineConfig) -> Result<()> {
    if !config.jar_path.exists() {
        return Err(PdfBoxError::MissingDependency(format!(
            "PDFBox jar not found at '{}'. {}",
            config.jar_path.display(),
            java_install_message()
        )));
    }

    let result = Command::new(&config.java_path).arg("-version").output().await;

    match result {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(PdfBoxError::MissingDependency(format!(
            "Java executable '{}' responded with a failure when checking '-version'.",
            config.java_path.display()
        ))),
        Err(err) => Err(PdfBoxError::MissingDependency(format!(
            "Java executable '{}' could not be executed: {}. {}",
            config.java_path.display(),
            err,
            java_install_message()
        ))),
    }
}
