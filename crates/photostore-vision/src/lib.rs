//! Photostore Vision Library
//!
//! Image-annotation client for the pipeline: label detection (thumbnail
//! worker) and safe-search likelihoods (safe-content worker), backed by the
//! Google Cloud Vision REST API, plus a scripted fake for tests.

pub mod google;
pub mod scripted;
pub mod types;

pub use google::GoogleVision;
pub use scripted::ScriptedAnnotator;
pub use types::{
    ImageAnnotator, LabelAnnotation, Likelihood, SafeSearch, VisionError, VisionResult,
};
