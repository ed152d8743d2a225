//! Temporary-artifact lifecycle for subprocess runs.
//!
//! Every artifact lives under the shared OS temp directory and is named
//! `pdfbox_node_<prefix>_<suffix>` with a random 32-hex-digit suffix.
//! Random-name uniqueness is the sole concurrency-safety mechanism across
//! concurrent batch runs on the same host; there is no locking.
//!
//! [`TempFile`] and [`TempDir`] are RAII guards: `Drop` schedules a
//! best-effort removal so early returns and panics cannot leak artifacts,
//! while the explicit async `cleanup()` runs on the orderly path so deletion
//! completes before an item's processing returns. Deletion failures are
//! swallowed after a debug-level log record; they never replace the error of
//! the operation they follow.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Random hexadecimal suffix for temp-artifact names.
///
/// 32 hex digits (128 random bits), well above the 16-digit floor needed to
/// make collisions between concurrent runs negligible.
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A unique file path under the shared temp directory.
pub fn scratch_path(prefix: &str, extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pdfbox_node_{}_{}.{}", prefix, unique_suffix(), extension))
}

/// A unique directory path under the shared temp directory. Not created.
pub fn scratch_dir_path(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pdfbox_node_{}_{}", prefix, unique_suffix()))
}

/// Best-effort file removal; failures are logged and discarded.
pub async fn remove_quiet(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        tracing::debug!("failed to remove temp file {}: {}", path.display(), e);
    }
}

fn schedule_removal(path: PathBuf, is_dir: bool) {
    // Drop can't be async; fall back to blocking removal when no runtime is live
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(async move {
            let result = if is_dir {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            if let Err(e) = result {
                tracing::debug!("deferred temp cleanup of {} failed: {}", path.display(), e);
            }
        });
    } else {
        let result = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        if let Err(e) = result {
            tracing::debug!("deferred temp cleanup of {} failed: {}", path.display(), e);
        }
    }
}

/// RAII guard for a temporary file.
pub struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    /// Write `bytes` to a uniquely named file and guard it.
    pub async fn create(prefix: &str, extension: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let path = scratch_path(prefix, extension);
        fs::write(&path, bytes).await?;
        Ok(Self { path, armed: true })
    }

    /// Guard a path that an external tool is expected to produce. The file
    /// need not exist yet; removal of a missing file is quietly ignored.
    pub fn adopt(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, consuming the guard. Failures are swallowed.
    pub async fn cleanup(mut self) {
        self.armed = false;
        remove_quiet(&self.path).await;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            schedule_removal(self.path.clone(), false);
        }
    }
}

/// RAII guard for a temporary directory, removed recursively.
pub struct TempDir {
    path: PathBuf,
    armed: bool,
}

impl TempDir {
    /// Create a uniquely named directory and guard it.
    pub async fn create(prefix: &str) -> std::io::Result<Self> {
        let path = scratch_dir_path(prefix);
        fs::create_dir_all(&path).await?;
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory and its contents now, consuming the guard.
    /// Failures are swallowed.
    pub async fn cleanup(mut self) {
        self.armed = false;
        if let Err(e) = fs::remove_dir_all(&self.path).await {
            tracing::debug!("failed to remove temp dir {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if self.armed {
            schedule_removal(self.path.clone(), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_suffix_shape() {
        let suffix = unique_suffix();
        assert_eq!(suffix.len(), 32);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unique_suffix_no_collisions_across_100k() {
        let mut seen = HashSet::with_capacity(100_000);
        for _ in 0..100_000 {
            assert!(seen.insert(unique_suffix()), "suffix collision");
        }
    }

    #[test]
    fn test_scratch_path_under_temp_dir() {
        let path = scratch_path("input", "pdf");
        assert!(path.starts_with(std::env::temp_dir()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("pdfbox_node_input_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_scratch_paths_are_distinct() {
        assert_ne!(scratch_dir_path("images"), scratch_dir_path("images"));
    }

    #[tokio::test]
    async fn test_temp_file_create_and_cleanup() {
        let file = TempFile::create("test", "bin", b"payload").await.unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(fs::read(&path).await.unwrap(), b"payload");

        file.cleanup().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_temp_file_drop_schedules_removal() {
        let path;
        {
            let file = TempFile::create("test_drop", "bin", b"x").await.unwrap();
            path = file.path().to_path_buf();
            assert!(path.exists());
        }
        // Give the runtime time to run the deferred removal
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_temp_file_adopt_tolerates_missing_file() {
        let file = TempFile::adopt(scratch_path("never_created", "txt"));
        // Cleanup of a file that was never produced must not panic or error
        file.cleanup().await;
    }

    #[tokio::test]
    async fn test_temp_dir_cleanup_is_recursive() {
        let dir = TempDir::create("test_dir").await.unwrap();
        let path = dir.path().to_path_buf();
        fs::create_dir_all(path.join("nested")).await.unwrap();
        fs::write(path.join("nested/img-1.png"), b"png").await.unwrap();
        fs::write(path.join("img-0.png"), b"png").await.unwrap();

        dir.cleanup().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_temp_dir_drop_schedules_removal() {
        let path;
        {
            let dir = TempDir::create("test_dir_drop").await.unwrap();
            path = dir.path().to_path_buf();
            fs::write(path.join("leftover.png"), b"png").await.unwrap();
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_quiet_swallows_missing_file() {
        remove_quiet(Path::new("/nonexistent/pdfbox_node_nothing.txt")).await;
    }
}
