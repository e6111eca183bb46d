// src/core/fs_ops.rs
//! Async file helpers shared by settings, history and exports.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() || fs::metadata(path).await.is_ok() {
            return Ok(());
        }
        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        app_log!(info, "Created directory: {}", path.display());
        Ok(())
    }

    pub async fn file_exists(path: &Path) -> bool {
        fs::metadata(path).await.is_ok_and(|meta| meta.is_file())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write through a sibling temp file so readers never see a torn file.
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .await
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;

        app_log!(debug, "Written file: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("state.json");

        FsOps::write_file_safe(&path, "{}").await.unwrap();

        assert!(FsOps::file_exists(&path).await);
        assert_eq!(FsOps::read_file_safe(&path).await.unwrap(), "{}");
        assert!(!FsOps::file_exists(&path.with_extension("tmp")).await);
    }

    #[tokio::test]
    async fn test_read_missing_file_has_context() {
        let dir = TempDir::new().unwrap();
        let err = FsOps::read_file_safe(&dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[tokio::test]
    async fn test_directories_are_not_files() {
        let dir = TempDir::new().unwrap();
        assert!(!FsOps::file_exists(dir.path()).await);
    }
}
