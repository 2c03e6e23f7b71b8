//! Local filesystem backend, used for development and tests.

use std::path::{Path, PathBuf};

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "failed to create storage directory {}: {e}",
                base_path.display()
            ))
        })?;

        Ok(Self {
            base_path,
            base_url,
        })
    }

    /// Map a key to a path, rejecting traversal out of the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        Self::ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(self.public_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path(), "http://localhost/blobs".to_string())
            .await
            .expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn upload_download_delete_roundtrip() {
        let (_dir, storage) = storage().await;
        let url = storage
            .upload("a.cat.png", "image/png", b"bytes".to_vec())
            .await
            .expect("upload");
        assert_eq!(url, "http://localhost/blobs/a.cat.png");
        assert_eq!(storage.download("a.cat.png").await.expect("download"), b"bytes");
        storage.delete("a.cat.png").await.expect("delete");
        assert!(matches!(
            storage.download("a.cat.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn nested_keys_create_parent_dirs() {
        let (_dir, storage) = storage().await;
        storage
            .upload("thumbnails/a.cat.png", "image/png", b"t".to_vec())
            .await
            .expect("upload");
        assert_eq!(
            storage.download("thumbnails/a.cat.png").await.expect("download"),
            b"t"
        );
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.delete("never-existed.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_keys_rejected() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.download("../escape.png").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
