use std::sync::Arc;

use anyhow::{Context, Result};
use photostore_bus::{run::shutdown_signal, PubSubPublisher};
use photostore_core::{telemetry, Config};
use photostore_db::PgPhotoRepository;
use photostore_storage::GcsStorage;
use photostore_web::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = photostore_db::connect_and_migrate(config.database_url()?)
        .await
        .context("failed to connect to database")?;

    let state = Arc::new(AppState {
        storage: Arc::new(GcsStorage::new(
            config.bucket.clone(),
            config.gcp_access_token.clone(),
        )?),
        photos: Arc::new(PgPhotoRepository::new(pool)),
        publisher: Arc::new(PubSubPublisher::new(
            config.project_id.clone(),
            config.gcp_access_token.clone(),
        )?),
        ingress_topic: config.ingress_topic.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(addr = %addr, bucket = %config.bucket, "Starting web app");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
