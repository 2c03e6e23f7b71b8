//! Annotation types and the annotator trait.

use async_trait::async_trait;
use photostore_core::AppError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type VisionResult<T> = Result<T, VisionError>;

impl From<VisionError> for AppError {
    fn from(err: VisionError) -> Self {
        AppError::Vision(err.to_string())
    }
}

/// Ordinal likelihood that an image contains a given unsafe category.
///
/// Variant order is the ordinal scale (0–5); comparisons use it directly,
/// e.g. `safe.adult >= Likelihood::Possible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Likelihood {
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl<'de> Deserialize<'de> for Likelihood {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Unrecognized wire values degrade to Unknown instead of failing the
        // whole annotate response.
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "VERY_UNLIKELY" => Self::VeryUnlikely,
            "UNLIKELY" => Self::Unlikely,
            "POSSIBLE" => Self::Possible,
            "LIKELY" => Self::Likely,
            "VERY_LIKELY" => Self::VeryLikely,
            _ => Self::Unknown,
        })
    }
}

impl Likelihood {
    /// Ordinal score 0–5.
    pub fn score(self) -> u8 {
        self as u8
    }

    /// Likelihood for an ordinal score; values above 5 saturate.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::Unknown,
            1 => Self::VeryUnlikely,
            2 => Self::Unlikely,
            3 => Self::Possible,
            4 => Self::Likely,
            _ => Self::VeryLikely,
        }
    }
}

impl Default for Likelihood {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Safe-search likelihoods for one image.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SafeSearch {
    pub adult: Likelihood,
    pub spoof: Likelihood,
    pub medical: Likelihood,
    pub violence: Likelihood,
    pub racy: Likelihood,
}

/// One descriptive label with the classifier's confidence.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelAnnotation {
    pub description: String,
    #[serde(default)]
    pub score: Option<f32>,
}

/// Image-understanding client. Images are referenced by URI (`gs://...` in
/// production) so the classifier reads them from the store directly.
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    /// Up to `max_results` descriptive labels for the image.
    async fn labels(
        &self,
        image_uri: &str,
        max_results: u32,
    ) -> VisionResult<Vec<LabelAnnotation>>;

    /// Safe-search likelihoods for the image.
    async fn safe_search(&self, image_uri: &str) -> VisionResult<SafeSearch>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn likelihood_ordering_matches_ordinal_scale() {
        assert!(Likelihood::VeryLikely > Likelihood::Likely);
        assert!(Likelihood::Possible > Likelihood::Unlikely);
        assert!(Likelihood::Unknown < Likelihood::VeryUnlikely);
        for score in 0..=5 {
            assert_eq!(Likelihood::from_score(score).score(), score);
        }
    }

    #[test]
    fn likelihood_parses_wire_names() {
        let parsed: Likelihood = serde_json::from_str("\"VERY_LIKELY\"").expect("parse");
        assert_eq!(parsed, Likelihood::VeryLikely);
        // Unrecognized values degrade to Unknown rather than failing the response.
        let parsed: Likelihood = serde_json::from_str("\"SOMETHING_NEW\"").expect("parse");
        assert_eq!(parsed, Likelihood::Unknown);
    }

    #[test]
    fn safe_search_defaults_missing_fields_to_unknown() {
        let parsed: SafeSearch =
            serde_json::from_str(r#"{"adult": "LIKELY", "violence": "UNLIKELY"}"#).expect("parse");
        assert_eq!(parsed.adult, Likelihood::Likely);
        assert_eq!(parsed.violence, Likelihood::Unlikely);
        assert_eq!(parsed.racy, Likelihood::Unknown);
    }
}
