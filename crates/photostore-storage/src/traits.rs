//! Storage abstraction trait.

use async_trait::async_trait;
use photostore_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Object-store backend.
///
/// Uploaded objects are publicly readable; [`Storage::public_url`] returns
/// the stable read URL for a key without touching the backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key` with the given content type and make it
    /// publicly readable. Returns the public URL.
    async fn upload(&self, key: &str, content_type: &str, data: Vec<u8>)
        -> StorageResult<String>;

    /// Fetch the full object at `key`.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete the object at `key`. Deleting a missing object yields
    /// [`StorageError::NotFound`]; callers doing best-effort cleanup ignore
    /// it per blob.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Public read URL for `key`.
    fn public_url(&self, key: &str) -> String;
}
