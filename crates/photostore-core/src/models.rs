//! Photo record model.

use serde::Serialize;

/// A stored photo and its processing metadata.
///
/// A row exists from the moment the original blob upload succeeds.
/// `has_thumbnail` starts false and flips to true exactly once, after the
/// thumbnail worker has stored the derived blob and fetched labels; it is
/// never rolled back. `label` is set together with `has_thumbnail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Photo {
    pub id: i64,
    /// Object-store key of the original blob, `<uuid>.<sanitized-filename>`.
    pub filename: String,
    pub label: Option<String>,
    pub has_thumbnail: bool,
}
