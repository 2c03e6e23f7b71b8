//! Photostore Worker Library
//!
//! The two pipeline consumers. Each implements
//! [`photostore_bus::MessageHandler`] and classifies failures as retryable
//! or permanent; the shared subscriber loop settles deliveries accordingly.

pub mod safeimage;
pub mod thumbnail;

pub use safeimage::SafeImageHandler;
pub use thumbnail::ThumbnailHandler;

use photostore_bus::Disposition;

/// Failure classification used inside handlers; the loop only ever sees the
/// resulting [`Disposition`].
pub(crate) enum StepError {
    Retry(anyhow::Error),
    Discard(anyhow::Error),
}

impl StepError {
    pub(crate) fn into_disposition(self) -> Disposition {
        match self {
            StepError::Retry(e) => Disposition::Retry(e),
            StepError::Discard(e) => Disposition::Discard(e),
        }
    }
}

/// `gs://` URI the classifier reads an object from.
pub(crate) fn gs_uri(bucket: &str, key: &str) -> String {
    format!("gs://{bucket}/{key}")
}
