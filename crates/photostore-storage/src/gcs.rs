//! Google Cloud Storage backend over the JSON API.
//!
//! Uses plain HTTPS with a bearer token rather than a vendor SDK. Objects
//! are uploaded with `predefinedAcl=publicRead` so the public URL is valid
//! as soon as the upload returns; no separate ACL call is needed.

use std::time::Duration;

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;

const PUBLIC_BASE: &str = "https://storage.googleapis.com";
const API_BASE: &str = "https://storage.googleapis.com/storage/v1";
const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1";
const HTTP_TIMEOUT_SECS: u64 = 60;

pub struct GcsStorage {
    http_client: reqwest::Client,
    bucket: String,
    access_token: Option<String>,
}

impl GcsStorage {
    pub fn new(bucket: impl Into<String>, access_token: Option<String>) -> StorageResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                StorageError::ConfigError(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            bucket: bucket.into(),
            access_token,
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for GcsStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        Self::validate_key(key)?;
        let url = format!(
            "{UPLOAD_BASE}/b/{}/o?uploadType=media&name={}&predefinedAcl=publicRead",
            self.bucket,
            urlencoding::encode(key)
        );

        let response = self
            .authorize(self.http_client.post(&url))
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(format!(
                "{key}: {status} {body}"
            )));
        }

        tracing::debug!(key = %key, bucket = %self.bucket, "Uploaded object");
        Ok(self.public_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        Self::validate_key(key)?;
        let url = format!(
            "{API_BASE}/b/{}/o/{}?alt=media",
            self.bucket,
            urlencoding::encode(key)
        );

        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::DownloadFailed(format!(
                "{key}: {status} {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Self::validate_key(key)?;
        let url = format!(
            "{API_BASE}/b/{}/o/{}",
            self.bucket,
            urlencoding::encode(key)
        );

        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::DeleteFailed(format!(
                "{key}: {status} {body}"
            )));
        }

        tracing::debug!(key = %key, bucket = %self.bucket, "Deleted object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{PUBLIC_BASE}/{}/{key}", self.bucket)
    }
}
