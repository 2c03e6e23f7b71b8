//! Thumbnail worker: derive a bounded thumbnail, fetch labels, finish the
//! record.
//!
//! Consumes the ingress topic, whose messages carry the object key of a
//! freshly uploaded original. Work is idempotent at the blob level and the
//! label update is a plain overwrite, so redeliveries are safe.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use photostore_bus::{BusMessage, Disposition, MessageHandler};
use photostore_core::content_type::content_type_of;
use photostore_core::keys::thumbnail_key;
use photostore_core::pipeline::PipelineEvent;
use photostore_db::PhotoRepository;
use photostore_processing::{format_for_content_type, THUMBNAIL_MAX_DIM};
use photostore_storage::Storage;
use photostore_vision::ImageAnnotator;

use crate::{gs_uri, StepError};

/// Label annotations requested per image.
const MAX_LABELS: u32 = 3;

pub struct ThumbnailHandler {
    storage: Arc<dyn Storage>,
    photos: Arc<dyn PhotoRepository>,
    annotator: Arc<dyn ImageAnnotator>,
    bucket: String,
}

impl ThumbnailHandler {
    pub fn new(
        storage: Arc<dyn Storage>,
        photos: Arc<dyn PhotoRepository>,
        annotator: Arc<dyn ImageAnnotator>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            photos,
            annotator,
            bucket: bucket.into(),
        }
    }

    async fn process(&self, key: &str) -> Result<(), StepError> {
        let content_type = content_type_of(key).ok_or_else(|| {
            StepError::Discard(anyhow!("key {key} has no recognized extension"))
        })?;

        let original = self
            .storage
            .download(key)
            .await
            .with_context(|| format!("downloading {key}"))
            .map_err(StepError::Retry)?;

        // An undecodable blob will fail the same way on every redelivery.
        let thumbnail = photostore_processing::thumbnail(
            &original,
            THUMBNAIL_MAX_DIM,
            format_for_content_type(content_type),
        )
        .map_err(StepError::Discard)?;

        self.storage
            .upload(&thumbnail_key(key), content_type, thumbnail.to_vec())
            .await
            .with_context(|| format!("uploading thumbnail for {key}"))
            .map_err(StepError::Retry)?;

        let labels = self
            .annotator
            .labels(&gs_uri(&self.bucket, key), MAX_LABELS)
            .await
            .with_context(|| format!("labeling {key}"))
            .map_err(StepError::Retry)?;
        let label = labels
            .iter()
            .map(|l| l.description.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let updated = self
            .photos
            .set_label_and_thumbnail(key, &label)
            .await
            .map_err(|e| StepError::Retry(e.into()))?;
        if !updated {
            // The upload handler commits the record before publishing, but
            // that commit may not be visible yet under replica lag.
            return Err(StepError::Retry(anyhow!(
                "no photo record for {key} yet"
            )));
        }

        tracing::info!(
            key = %key,
            label = %label,
            event = ?PipelineEvent::ThumbnailStored,
            "Thumbnail stored and record finished"
        );
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for ThumbnailHandler {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    async fn handle(&self, message: BusMessage) -> Disposition {
        let key = match std::str::from_utf8(&message.data) {
            Ok(key) => key.to_string(),
            Err(e) => {
                return Disposition::Discard(anyhow!("event payload is not UTF-8: {e}"));
            }
        };

        tracing::debug!(key = %key, "Processing upload event");
        match self.process(&key).await {
            Ok(()) => Disposition::Completed,
            Err(step) => step.into_disposition(),
        }
    }
}
