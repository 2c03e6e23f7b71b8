//! Photostore DB Library
//!
//! Photo-record persistence: the `PhotoRepository` trait, its Postgres
//! implementation, and an in-memory implementation for tests.

pub mod memory;
pub mod photos;

use photostore_core::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub use memory::InMemoryPhotos;
pub use photos::{PgPhotoRepository, PhotoRepository};

const MAX_CONNECTIONS: u32 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Connect a pool without touching the schema. Workers use this; the web
/// app owns migrations.
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Connect a pool and bring the schema up to date.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = connect(database_url).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Internal(format!("migration failed: {e}")))?;

    Ok(pool)
}
