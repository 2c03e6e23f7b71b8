//! Object-key scheme shared by the web app and both workers.
//!
//! Originals live at `<uuid>.<sanitized-filename>`; derived thumbnails at
//! `thumbnails/<same key>`. Key generation is centralized here so every
//! component agrees on the layout.

use uuid::Uuid;

use crate::content_type::sanitize_filename;

/// Prefix under which derived thumbnails are stored.
pub const THUMBNAIL_PREFIX: &str = "thumbnails/";

/// Generate a fresh object key for an uploaded file.
///
/// The random component guarantees two uploads of the same filename never
/// collide.
pub fn object_key(original_filename: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), sanitize_filename(original_filename))
}

/// Key of the thumbnail derived from an original's key.
pub fn thumbnail_key(key: &str) -> String {
    format!("{THUMBNAIL_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_for_identical_filenames_differ() {
        assert_ne!(object_key("cat.png"), object_key("cat.png"));
    }

    #[test]
    fn key_keeps_sanitized_filename_suffix() {
        let key = object_key("my cat.png");
        assert!(key.ends_with(".my_cat.png"), "got {key}");
    }

    #[test]
    fn thumbnail_key_is_prefixed() {
        assert_eq!(thumbnail_key("abc.cat.png"), "thumbnails/abc.cat.png");
    }
}
