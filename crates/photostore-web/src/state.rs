//! Application state: dependency-injected client handles.
//!
//! All external collaborators are constructed once by the process entry
//! point and passed in as trait objects; handlers never reach for globals.

use std::sync::Arc;

use photostore_bus::Publisher;
use photostore_db::PhotoRepository;
use photostore_storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub photos: Arc<dyn PhotoRepository>,
    pub publisher: Arc<dyn Publisher>,
    /// Topic new-upload keys are published to.
    pub ingress_topic: String,
}
