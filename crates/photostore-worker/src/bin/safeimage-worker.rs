use std::sync::Arc;

use anyhow::{Context, Result};
use photostore_bus::run::{run_subscriber, shutdown_signal, SubscriberLoopConfig};
use photostore_bus::PubSubSubscriber;
use photostore_core::{telemetry, Config};
use photostore_storage::GcsStorage;
use photostore_vision::GoogleVision;
use photostore_worker::SafeImageHandler;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;

    let handler = Arc::new(SafeImageHandler::new(
        Arc::new(GcsStorage::new(
            config.bucket.clone(),
            config.gcp_access_token.clone(),
        )?),
        Arc::new(GoogleVision::new(config.gcp_access_token.clone())?),
        config.bucket.clone(),
    ));

    let subscriber = Arc::new(PubSubSubscriber::new(
        config.project_id.clone(),
        config.safeimage_subscription.clone(),
        config.gcp_access_token.clone(),
    )?);

    tracing::info!(
        subscription = %config.safeimage_subscription,
        bucket = %config.bucket,
        "Starting safe-content worker"
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
