use std::sync::Arc;

use anyhow::{Context, Result};
use photostore_bus::run::{run_subscriber, shutdown_signal, SubscriberLoopConfig};
use photostore_bus::PubSubSubscriber;
use photostore_core::{telemetry, Config};
use photostore_db::PgPhotoRepository;
use photostore_storage::GcsStorage;
use photostore_vision::GoogleVision;
use photostore_worker::ThumbnailHandler;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = photostore_db::connect(config.database_url()?)
        .await
        .context("failed to connect to database")?;

    let handler = Arc::new(ThumbnailHandler::new(
        Arc::new(GcsStorage::new(
            config.bucket.clone(),
            config.gcp_access_token.clone(),
        )?),
        Arc::new(PgPhotoRepository::new(pool)),
        Arc::new(GoogleVision::new(config.gcp_access_token.clone())?),
        config.bucket.clone(),
    ));

    let subscriber = Arc::new(PubSubSubscriber::new(
        config.project_id.clone(),
        config.thumbnail_subscription.clone(),
        config.gcp_access_token.clone(),
    )?);

    tracing::info!(
        subscription = %config.thumbnail_subscription,
        bucket = %config.bucket,
        "Starting thumbnail worker"
    );

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    run_subscriber(
        subscriber,
        handler,
        SubscriberLoopConfig::default(),
        shutdown_rx,
    )
    .await
}
