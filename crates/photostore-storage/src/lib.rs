//! Photostore Storage Library
//!
//! Object-store abstraction and backends. Originals and thumbnails share one
//! bucket; every uploaded object is made publicly readable so listing pages
//! can link to it directly. Key layout is owned by `photostore_core::keys`.

pub mod gcs;
pub mod local;
pub mod traits;

pub use gcs::GcsStorage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
