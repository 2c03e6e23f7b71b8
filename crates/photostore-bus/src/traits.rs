//! Publisher/subscriber traits and the per-message disposition contract.

use async_trait::async_trait;
use photostore_core::AppError;
use thiserror::Error;

use crate::message::BusMessage;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Pull failed: {0}")]
    PullFailed(String),

    #[error("Acknowledge failed: {0}")]
    AckFailed(String),

    #[error("Unknown topic or subscription: {0}")]
    Unknown(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type BusResult<T> = Result<T, BusError>;

impl From<BusError> for AppError {
    fn from(err: BusError) -> Self {
        AppError::Bus(err.to_string())
    }
}

/// Outcome of handling one delivered message.
///
/// The handler classifies; the surrounding loop decides what to do with the
/// delivery: `Completed` and `Skip` acknowledge, `Discard` acknowledges and
/// logs the permanent failure, `Retry` negatively acknowledges so the bus
/// redelivers.
#[derive(Debug)]
pub enum Disposition {
    /// Work finished.
    Completed,
    /// Message filtered out by policy; nothing to do.
    Skip,
    /// Transient failure; the message should be redelivered.
    Retry(anyhow::Error),
    /// Permanent failure; redelivery would fail the same way.
    Discard(anyhow::Error),
}

/// Per-message work unit implemented by each worker.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handler name used in run-loop logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, message: BusMessage) -> Disposition;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a message to a named topic.
    async fn publish(&self, topic: &str, message: BusMessage) -> BusResult<()>;
}

/// A message leased from a subscription, with the token needed to settle it.
#[derive(Debug)]
pub struct DeliveredMessage {
    pub message: BusMessage,
    pub ack_id: String,
}

/// Pull-based subscription client. At-least-once delivery: anything neither
/// acknowledged nor past its lease will come back.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Lease up to `max_messages` messages; may return fewer or none.
    async fn pull(&self, max_messages: usize) -> BusResult<Vec<DeliveredMessage>>;

    async fn acknowledge(&self, ack_id: &str) -> BusResult<()>;

    /// Negative acknowledgement: return the message for redelivery.
    async fn nack(&self, ack_id: &str) -> BusResult<()>;
}
