//! Uploaded files kept in a flat directory.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from the file store.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The name is empty or tries to leave the upload directory.
    #[error("invalid file name '{0}'")]
    InvalidName(String),
    /// No file with this name exists.
    #[error("File not found")]
    NotFound(String),
    /// Filesystem failure.
    #[error("file store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listing entry for one stored file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Stored name, including the timestamp prefix.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub upload_date: DateTime<Utc>,
}

/// Flat directory of uploads.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!(dir = %root.display(), "Upload directory ready");
        Ok(Self { root })
    }

    /// Saves an upload as `<unix-millis>-<original name>` and returns the
    /// stored name. Any directory part of `original_name` is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error for an unusable name or a failed write.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, FileStoreError> {
        let base = Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| FileStoreError::InvalidName(original_name.to_string()))?;

        let stored = format!("{}-{base}", Utc::now().timestamp_millis());
        tokio::fs::write(self.root.join(&stored), data).await?;
        info!(file = %stored, size = data.len(), "File stored");
        Ok(stored)
    }

    /// Lists stored files ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<StoredFile>, FileStoreError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            files.push(StoredFile {
                name,
                size: metadata.len(),
                upload_date: metadata.modified()?.into(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Reads a stored file.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError::InvalidName`] for names with path components,
    /// [`FileStoreError::NotFound`] if the file does not exist.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FileStoreError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !plain {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_prefixes_timestamp_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let stored = store.save("report.pdf", b"abc").await.unwrap();
        let (millis, rest) = stored.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest, "report.pdf");

        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, stored);
        assert_eq!(files[0].size, 3);
    }

    #[tokio::test]
    async fn save_drops_directory_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let stored = store.save("../../etc/passwd", b"x").await.unwrap();
        assert!(stored.ends_with("-passwd"));
        assert!(dir.path().join(&stored).exists());
        assert!(store.save("", b"x").await.is_err());
    }

    #[tokio::test]
    async fn read_rejects_traversal_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).await.unwrap();

        assert!(matches!(store.read("../secret").await, Err(FileStoreError::InvalidName(_))));
        assert!(matches!(store.read("..").await, Err(FileStoreError::InvalidName(_))));
        assert!(matches!(store.read("nope.txt").await, Err(FileStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn read_returns_saved_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let stored = store.save("a.txt", b"hello").await.unwrap();
        assert_eq!(store.read(&stored).await.unwrap(), b"hello");
    }
}
