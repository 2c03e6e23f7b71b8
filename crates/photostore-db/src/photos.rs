//! Photo repository: trait and Postgres implementation.

use async_trait::async_trait;
use photostore_core::{AppError, Photo};
use sqlx::PgPool;

/// Persistence operations on photo records. The trait seam lets the web app
/// and workers run against Postgres in production and an in-memory double in
/// tests.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Insert a fresh record for a just-uploaded blob
    /// (`label = NULL`, `has_thumbnail = false`).
    async fn insert(&self, filename: &str) -> Result<Photo, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Photo>, AppError>;

    /// Latest `limit` records by descending id.
    async fn latest(&self, limit: i64) -> Result<Vec<Photo>, AppError>;

    /// Record thumbnail completion: set the label and flip `has_thumbnail`
    /// to true. Returns false when no record matches `filename` (the
    /// upload's insert may not be visible yet).
    async fn set_label_and_thumbnail(&self, filename: &str, label: &str)
        -> Result<bool, AppError>;

    /// Delete by id, returning the removed record (for blob cleanup) or
    /// `None` when the id is unknown.
    async fn delete(&self, id: i64) -> Result<Option<Photo>, AppError>;
}

#[derive(Clone)]
pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn insert(&self, filename: &str) -> Result<Photo, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            "INSERT INTO photos (filename, label, has_thumbnail)
             VALUES ($1, NULL, FALSE)
             RETURNING id, filename, label, has_thumbnail",
        )
        .bind(filename)
        .fetch_one(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn get(&self, id: i64) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            "SELECT id, filename, label, has_thumbnail FROM photos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, filename, label, has_thumbnail FROM photos
             ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(photos)
    }

    async fn set_label_and_thumbnail(
        &self,
        filename: &str,
        label: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE photos SET label = $2, has_thumbnail = TRUE WHERE filename = $1",
        )
        .bind(filename)
        .bind(label)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            "DELETE FROM photos WHERE id = $1
             RETURNING id, filename, label, has_thumbnail",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(photo)
    }
}
