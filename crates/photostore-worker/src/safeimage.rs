//! Safe-content worker: screen new objects and blur the ones that trip the
//! moderation thresholds.
//!
//! Subscribes to bucket notifications, so every finalized object arrives
//! here, thumbnails included. Blurring overwrites the blob in place under
//! its original key, which means a redelivered event re-screens an already
//! blurred image and passes it.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use photostore_bus::{BusMessage, Disposition, MessageHandler, ObjectNotification};
use photostore_core::content_type::content_type_of;
use photostore_core::pipeline::PipelineEvent;
use photostore_processing::{format_for_content_type, MODERATION_BLUR_SIGMA};
use photostore_storage::Storage;
use photostore_vision::{ImageAnnotator, Likelihood, SafeSearch};

use crate::{gs_uri, StepError};

/// Moderation policy: blur on likely adult content or on anything beyond
/// very-unlikely violence.
pub fn should_blur(safe: &SafeSearch) -> bool {
    safe.adult >= Likelihood::Possible || safe.violence >= Likelihood::Unlikely
}

pub struct SafeImageHandler {
    storage: Arc<dyn Storage>,
    annotator: Arc<dyn ImageAnnotator>,
    bucket: String,
}

impl SafeImageHandler {
    pub fn new(
        storage: Arc<dyn Storage>,
        annotator: Arc<dyn ImageAnnotator>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            annotator,
            bucket: bucket.into(),
        }
    }

    async fn process(&self, key: &str) -> Result<(), StepError> {
        let safe = self
            .annotator
            .safe_search(&gs_uri(&self.bucket, key))
            .await
            .with_context(|| format!("screening {key}"))
            .map_err(StepError::Retry)?;

        if !should_blur(&safe) {
            tracing::debug!(
                key = %key,
                adult = ?safe.adult,
                violence = ?safe.violence,
                event = ?PipelineEvent::ModerationPassed,
                "Image passed moderation"
            );
            return Ok(());
        }

        let content_type = content_type_of(key).ok_or_else(|| {
            StepError::Discard(anyhow!("key {key} has no recognized extension"))
        })?;

        let original = self
            .storage
            .download(key)
            .await
            .with_context(|| format!("downloading {key}"))
            .map_err(StepError::Retry)?;

        let blurred = photostore_processing::blur(
            &original,
            MODERATION_BLUR_SIGMA,
            format_for_content_type(content_type),
        )
        .map_err(StepError::Discard)?;

        self.storage
            .upload(key, content_type, blurred.to_vec())
            .await
            .with_context(|| format!("replacing {key} with blurred copy"))
            .map_err(StepError::Retry)?;

        tracing::warn!(
            key = %key,
            adult = ?safe.adult,
            violence = ?safe.violence,
            event = ?PipelineEvent::ModerationBlurred,
            "Image blurred by moderation"
        );
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for SafeImageHandler {
    fn name(&self) -> &'static str {
        "safeimage"
    }

    async fn handle(&self, message: BusMessage) -> Disposition {
        // Bucket notifications also fire for metadata updates and for the
        // blurred rewrite itself (which carries overwroteGeneration).
        if !message.is_new_object_finalize() {
            return Disposition::Skip;
        }

        let notification: ObjectNotification = match serde_json::from_slice(&message.data) {
            Ok(n) => n,
            Err(e) => {
                return Disposition::Discard(anyhow!("malformed object notification: {e}"));
            }
        };

        tracing::debug!(key = %notification.name, "Screening finalized object");
        match self.process(&notification.name).await {
            Ok(()) => Disposition::Completed,
            Err(step) => step.into_disposition(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safe(adult: Likelihood, violence: Likelihood) -> SafeSearch {
        SafeSearch {
            adult,
            violence,
            ..SafeSearch::default()
        }
    }

    #[test]
    fn blurs_on_possible_or_worse_adult_content() {
        for adult in [
            Likelihood::Possible,
            Likelihood::Likely,
            Likelihood::VeryLikely,
        ] {
            assert!(should_blur(&safe(adult, Likelihood::VeryUnlikely)));
        }
    }

    #[test]
    fn blurs_on_any_plausible_violence() {
        for violence in [
            Likelihood::Unlikely,
            Likelihood::Possible,
            Likelihood::Likely,
            Likelihood::VeryLikely,
        ] {
            assert!(should_blur(&safe(Likelihood::VeryUnlikely, violence)));
        }
    }

    #[test]
    fn passes_tame_images() {
        assert!(!should_blur(&safe(
            Likelihood::VeryUnlikely,
            Likelihood::VeryUnlikely
        )));
        assert!(!should_blur(&safe(
            Likelihood::Unlikely,
            Likelihood::VeryUnlikely
        )));
        assert!(!should_blur(&safe(
            Likelihood::Unknown,
            Likelihood::Unknown
        )));
    }
}
