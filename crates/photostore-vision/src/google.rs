//! Google Cloud Vision REST client.
//!
//! One `images:annotate` call per feature, mirroring how the pipeline uses
//! the API: the thumbnail worker asks for labels, the safe-content worker
//! for safe-search. Images are referenced by `gs://` URI so the API reads
//! them from the bucket directly.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::types::{
    ImageAnnotator, LabelAnnotation, SafeSearch, VisionError, VisionResult,
};

const API_BASE: &str = "https://vision.googleapis.com/v1";
const HTTP_TIMEOUT_SECS: u64 = 60;

pub struct GoogleVision {
    http_client: reqwest::Client,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Option<Vec<LabelAnnotation>>,
    #[serde(default)]
    safe_search_annotation: Option<SafeSearch>,
    #[serde(default)]
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl GoogleVision {
    pub fn new(access_token: Option<String>) -> VisionResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| VisionError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            access_token,
        })
    }

    async fn annotate(
        &self,
        image_uri: &str,
        feature: serde_json::Value,
    ) -> VisionResult<AnnotateImageResponse> {
        let url = format!("{API_BASE}/images:annotate");
        let body = json!({
            "requests": [{
                "image": { "source": { "imageUri": image_uri } },
                "features": [feature],
            }]
        });

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VisionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::RequestFailed(format!("{status} {body}")));
        }

        let annotated: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;

        let first = annotated
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::InvalidResponse("empty responses array".to_string()))?;

        if let Some(error) = first.error {
            return Err(VisionError::Api {
                code: error.code,
                message: error.message,
            });
        }

        Ok(first)
    }
}

#[async_trait]
impl ImageAnnotator for GoogleVision {
    async fn labels(
        &self,
        image_uri: &str,
        max_results: u32,
    ) -> VisionResult<Vec<LabelAnnotation>> {
        let response = self
            .annotate(
                image_uri,
                json!({ "type": "LABEL_DETECTION", "maxResults": max_results }),
            )
            .await?;
        let labels = response.label_annotations.unwrap_or_default();
        tracing::debug!(image_uri = %image_uri, count = labels.len(), "Label detection done");
        Ok(labels)
    }

    async fn safe_search(&self, image_uri: &str) -> VisionResult<SafeSearch> {
        let response = self
            .annotate(image_uri, json!({ "type": "SAFE_SEARCH_DETECTION" }))
            .await?;
        let safe = response.safe_search_annotation.ok_or_else(|| {
            VisionError::InvalidResponse("missing safeSearchAnnotation".to_string())
        })?;
        tracing::debug!(
            image_uri = %image_uri,
            adult = ?safe.adult,
            violence = ?safe.violence,
            "Safe-search detection done"
        );
        Ok(safe)
    }
}
