//! Message model and storage-notification attributes.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Deserialize;

/// Attribute carrying the storage event type on provider notifications.
pub const EVENT_TYPE_ATTRIBUTE: &str = "eventType";

/// Event type signalling that a new object version was fully written.
pub const OBJECT_FINALIZE: &str = "OBJECT_FINALIZE";

/// Attribute present when a finalize event replaced an existing object
/// version rather than creating a new one.
pub const OVERWROTE_GENERATION_ATTRIBUTE: &str = "overwroteGeneration";

/// An opaque payload plus provider-supplied string attributes.
#[derive(Debug, Clone, Default)]
pub struct BusMessage {
    pub data: Bytes,
    pub attributes: HashMap<String, String>,
}

impl BusMessage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether this is a finalize/creation notification eligible for
    /// downstream processing: finalize event type and no overwrite marker.
    pub fn is_new_object_finalize(&self) -> bool {
        self.attribute(EVENT_TYPE_ATTRIBUTE) == Some(OBJECT_FINALIZE)
            && !self.attributes.contains_key(OVERWROTE_GENERATION_ATTRIBUTE)
    }
}

/// JSON body of a storage-provider object notification. Only the object name
/// is consumed; the rest of the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectNotification {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_without_overwrite_is_eligible() {
        let msg = BusMessage::new("{}").with_attribute(EVENT_TYPE_ATTRIBUTE, OBJECT_FINALIZE);
        assert!(msg.is_new_object_finalize());
    }

    #[test]
    fn overwrite_generation_disqualifies_even_a_finalize() {
        let msg = BusMessage::new("{}")
            .with_attribute(EVENT_TYPE_ATTRIBUTE, OBJECT_FINALIZE)
            .with_attribute(OVERWROTE_GENERATION_ATTRIBUTE, "12345");
        assert!(!msg.is_new_object_finalize());
    }

    #[test]
    fn non_finalize_events_are_ineligible() {
        let msg = BusMessage::new("{}").with_attribute(EVENT_TYPE_ATTRIBUTE, "OBJECT_DELETE");
        assert!(!msg.is_new_object_finalize());
        assert!(!BusMessage::new("{}").is_new_object_finalize());
    }

    #[test]
    fn notification_body_parses_object_name() {
        let body = r#"{"name": "abc.cat.png", "bucket": "p-photostore", "size": "123"}"#;
        let parsed: ObjectNotification = serde_json::from_str(body).expect("parse");
        assert_eq!(parsed.name, "abc.cat.png");
    }
}
