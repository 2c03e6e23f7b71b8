//! Subscriber run loop shared by both workers.
//!
//! Pulls batches, dispatches each message to the handler, and settles the
//! delivery according to the returned [`Disposition`]: ack on `Completed`,
//! `Skip`, and `Discard`; nack on `Retry` so the bus redelivers. The handler
//! classifies; only the loop touches ack state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::traits::{Disposition, MessageHandler, Subscriber};

/// Consecutive pull failures tolerated before the loop gives up.
const MAX_PULL_FAILURES: u32 = 5;

#[derive(Clone)]
pub struct SubscriberLoopConfig {
    pub max_batch: usize,
    pub poll_interval_ms: u64,
}

impl Default for SubscriberLoopConfig {
    fn default() -> Self {
        Self {
            max_batch: 10,
            poll_interval_ms: 1000,
        }
    }
}

/// Run the subscriber loop until shutdown is signalled or the subscription
/// stream fails repeatedly.
pub async fn run_subscriber(
    subscriber: Arc<dyn Subscriber>,
    handler: Arc<dyn MessageHandler>,
    config: SubscriberLoopConfig,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let mut pull_failures = 0u32;

    tracing::info!(
        handler = handler.name(),
        max_batch = config.max_batch,
        poll_interval_ms = config.poll_interval_ms,
        "Subscriber loop started"
    );

    loop {
        let batch = tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!(handler = handler.name(), "Shutdown signalled, stopping");
                return Ok(());
            }
            result = subscriber.pull(config.max_batch) => match result {
                Ok(batch) => {
                    pull_failures = 0;
                    batch
                }
                Err(e) => {
                    pull_failures += 1;
                    if pull_failures >= MAX_PULL_FAILURES {
                        bail!("subscription stream failed {pull_failures} times: {e}");
                    }
                    tracing::warn!(
                        handler = handler.name(),
                        error = %e,
                        failures = pull_failures,
                        "Pull failed, backing off"
                    );
                    sleep(poll_interval).await;
                    continue;
                }
            },
        };

        if batch.is_empty() {
            sleep(poll_interval).await;
            continue;
        }

        for delivered in batch {
            let disposition = handler.handle(delivered.message).await;
            let settle = match disposition {
                Disposition::Completed => {
                    tracing::debug!(handler = handler.name(), "Message completed");
                    subscriber.acknowledge(&delivered.ack_id).await
                }
                Disposition::Skip => {
                    tracing::debug!(handler = handler.name(), "Message skipped by filter");
                    subscriber.acknowledge(&delivered.ack_id).await
                }
                Disposition::Discard(error) => {
                    tracing::error!(
                        handler = handler.name(),
                        error = %error,
                        "Permanent failure, discarding message"
                    );
                    subscriber.acknowledge(&delivered.ack_id).await
                }
                Disposition::Retry(error) => {
                    tracing::warn!(
                        handler = handler.name(),
                        error = %error,
                        "Transient failure, returning message for redelivery"
                    );
                    subscriber.nack(&delivered.ack_id).await
                }
            };
            if let Err(e) = settle {
                tracing::error!(
                    handler = handler.name(),
                    error = %e,
                    "Failed to settle delivery; the bus will redeliver after the lease expires"
                );
            }
        }
    }
}

/// Resolve when SIGINT or SIGTERM arrives. Binaries feed this into the
/// shutdown channel of [`run_subscriber`].
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received terminate signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBus;
    use crate::message::BusMessage;
    use crate::traits::Publisher;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first delivery with `Retry`, completes afterwards.
    struct FlakyHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MessageHandler for FlakyHandler {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn handle(&self, _message: BusMessage) -> Disposition {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Disposition::Retry(anyhow::anyhow!("transient"))
            } else {
                Disposition::Completed
            }
        }
    }

    #[tokio::test]
    async fn retry_disposition_causes_redelivery() {
        let bus = InMemoryBus::new();
        bus.create_subscription("uploads", "workers");
        bus.publish("uploads", BusMessage::new("k.png")).await.expect("publish");

        let handler = Arc::new(FlakyHandler {
            calls: AtomicUsize::new(0),
        });
        let subscriber = Arc::new(bus.subscriber("workers"));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let config = SubscriberLoopConfig {
            max_batch: 10,
            poll_interval_ms: 10,
        };
        let handler_clone = Arc::clone(&handler);
        let join = tokio::spawn(run_subscriber(
            subscriber,
            handler_clone,
            config,
            shutdown_rx,
        ));

        // First delivery nacks, second completes.
        tokio::time::timeout(Duration::from_secs(5), async {
            while handler.calls.load(Ordering::SeqCst) < 2 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("handler should be invoked twice");

        shutdown_tx.send(()).await.expect("shutdown");
        join.await.expect("join").expect("loop result");
        assert_eq!(bus.pending("workers"), 0);
    }
}
