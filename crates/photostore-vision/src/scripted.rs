//! Scripted annotator for tests: fixed verdicts per image URI, with a
//! default for anything unscripted.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::{
    ImageAnnotator, LabelAnnotation, SafeSearch, VisionError, VisionResult,
};

#[derive(Default)]
pub struct ScriptedAnnotator {
    labels: Mutex<HashMap<String, Vec<String>>>,
    verdicts: Mutex<HashMap<String, SafeSearch>>,
    default_labels: Vec<String>,
    fail: Mutex<bool>,
}

impl ScriptedAnnotator {
    pub fn new() -> Self {
        Self {
            default_labels: vec!["Photograph".to_string()],
            ..Self::default()
        }
    }

    pub fn script_labels(&self, image_uri: &str, labels: &[&str]) {
        self.labels.lock().expect("lock").insert(
            image_uri.to_string(),
            labels.iter().map(|l| l.to_string()).collect(),
        );
    }

    pub fn script_safe_search(&self, image_uri: &str, safe: SafeSearch) {
        self.verdicts
            .lock()
            .expect("lock")
            .insert(image_uri.to_string(), safe);
    }

    /// Make every subsequent call fail, to exercise retry paths.
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().expect("lock") = failing;
    }

    fn check_failing(&self) -> VisionResult<()> {
        if *self.fail.lock().expect("lock") {
            return Err(VisionError::RequestFailed("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageAnnotator for ScriptedAnnotator {
    async fn labels(
        &self,
        image_uri: &str,
        max_results: u32,
    ) -> VisionResult<Vec<LabelAnnotation>> {
        self.check_failing()?;
        let scripted = self
            .labels
            .lock()
            .expect("lock")
            .get(image_uri)
            .cloned()
            .unwrap_or_else(|| self.default_labels.clone());
        Ok(scripted
            .into_iter()
            .take(max_results as usize)
            .map(|description| LabelAnnotation {
                description,
                score: Some(0.9),
            })
            .collect())
    }

    async fn safe_search(&self, image_uri: &str) -> VisionResult<SafeSearch> {
        self.check_failing()?;
        Ok(self
            .verdicts
            .lock()
            .expect("lock")
            .get(image_uri)
            .copied()
            .unwrap_or_default())
    }
}
