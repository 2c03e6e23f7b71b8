//! In-memory photo repository for tests without a database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use photostore_core::{AppError, Photo};

use crate::photos::PhotoRepository;

#[derive(Default)]
pub struct InMemoryPhotos {
    rows: Mutex<BTreeMap<i64, Photo>>,
    next_id: Mutex<i64>,
}

impl InMemoryPhotos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a record by filename, for assertions.
    pub fn by_filename(&self, filename: &str) -> Option<Photo> {
        self.rows
            .lock()
            .expect("lock")
            .values()
            .find(|p| p.filename == filename)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PhotoRepository for InMemoryPhotos {
    async fn insert(&self, filename: &str) -> Result<Photo, AppError> {
        let mut next_id = self.next_id.lock().expect("lock");
        *next_id += 1;
        let photo = Photo {
            id: *next_id,
            filename: filename.to_string(),
            label: None,
            has_thumbnail: false,
        };
        self.rows
            .lock()
            .expect("lock")
            .insert(photo.id, photo.clone());
        Ok(photo)
    }

    async fn get(&self, id: i64) -> Result<Option<Photo>, AppError> {
        Ok(self.rows.lock().expect("lock").get(&id).cloned())
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Photo>, AppError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .values()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn set_label_and_thumbnail(
        &self,
        filename: &str,
        label: &str,
    ) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().expect("lock");
        let Some(photo) = rows.values_mut().find(|p| p.filename == filename) else {
            return Ok(false);
        };
        photo.label = Some(label.to_string());
        photo.has_thumbnail = true;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<Option<Photo>, AppError> {
        Ok(self.rows.lock().expect("lock").remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_latest_orders_descending() {
        let repo = InMemoryPhotos::new();
        let a = repo.insert("a.png").await.expect("insert");
        let b = repo.insert("b.png").await.expect("insert");
        assert!(b.id > a.id);
        assert!(!a.has_thumbnail);
        assert_eq!(a.label, None);

        let latest = repo.latest(10).await.expect("latest");
        assert_eq!(latest[0].filename, "b.png");
        assert_eq!(latest[1].filename, "a.png");
    }

    #[tokio::test]
    async fn set_label_flips_thumbnail_flag_once() {
        let repo = InMemoryPhotos::new();
        repo.insert("a.png").await.expect("insert");
        assert!(repo
            .set_label_and_thumbnail("a.png", "Cat, Whiskers")
            .await
            .expect("update"));
        let photo = repo.by_filename("a.png").expect("row");
        assert!(photo.has_thumbnail);
        assert_eq!(photo.label.as_deref(), Some("Cat, Whiskers"));

        assert!(!repo
            .set_label_and_thumbnail("missing.png", "x")
            .await
            .expect("update"));
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let repo = InMemoryPhotos::new();
        let photo = repo.insert("a.png").await.expect("insert");
        let removed = repo.delete(photo.id).await.expect("delete");
        assert_eq!(removed.map(|p| p.filename), Some("a.png".to_string()));
        assert!(repo.delete(photo.id).await.expect("delete").is_none());
    }
}
