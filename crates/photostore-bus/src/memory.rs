//! In-process bus used by tests and local development.
//!
//! Same contract as the Pub/Sub backend: topic fan-out to bound
//! subscriptions, leases with explicit ack, nack returning the message to
//! the front of its queue.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::message::BusMessage;
use crate::traits::{BusError, BusResult, DeliveredMessage, Publisher, Subscriber};

#[derive(Default)]
struct Inner {
    /// topic -> subscriptions fanned out to.
    bindings: HashMap<String, Vec<String>>,
    /// subscription -> undelivered messages.
    queues: HashMap<String, VecDeque<BusMessage>>,
    /// outstanding leases: ack_id -> (subscription, message).
    leased: HashMap<String, (String, BusMessage)>,
}

#[derive(Clone, Default)]
pub struct InMemoryBus {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a subscription to a topic; every publish on the topic is copied
    /// into the subscription's queue.
    pub fn create_subscription(&self, topic: &str, subscription: &str) {
        let mut inner = self.inner.lock().expect("bus lock");
        inner
            .bindings
            .entry(topic.to_string())
            .or_default()
            .push(subscription.to_string());
        inner.queues.entry(subscription.to_string()).or_default();
    }

    pub fn subscriber(&self, subscription: &str) -> MemorySubscriber {
        MemorySubscriber {
            inner: Arc::clone(&self.inner),
            subscription: subscription.to_string(),
        }
    }

    /// Undelivered message count, for test assertions.
    pub fn pending(&self, subscription: &str) -> usize {
        let inner = self.inner.lock().expect("bus lock");
        inner.queues.get(subscription).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, topic: &str, message: BusMessage) -> BusResult<()> {
        let mut inner = self.inner.lock().expect("bus lock");
        let subscriptions = inner
            .bindings
            .get(topic)
            .cloned()
            .unwrap_or_default();
        for subscription in subscriptions {
            inner
                .queues
                .entry(subscription)
                .or_default()
                .push_back(message.clone());
        }
        Ok(())
    }
}

pub struct MemorySubscriber {
    inner: Arc<Mutex<Inner>>,
    subscription: String,
}

#[async_trait]
impl Subscriber for MemorySubscriber {
    async fn pull(&self, max_messages: usize) -> BusResult<Vec<DeliveredMessage>> {
        let mut inner = self.inner.lock().expect("bus lock");
        if !inner.queues.contains_key(&self.subscription) {
            return Err(BusError::Unknown(self.subscription.clone()));
        }

        let mut delivered = Vec::new();
        for _ in 0..max_messages {
            let Some(message) = inner
                .queues
                .get_mut(&self.subscription)
                .and_then(VecDeque::pop_front)
            else {
                break;
            };
            let ack_id = Uuid::new_v4().to_string();
            inner
                .leased
                .insert(ack_id.clone(), (self.subscription.clone(), message.clone()));
            delivered.push(DeliveredMessage { message, ack_id });
        }
        Ok(delivered)
    }

    async fn acknowledge(&self, ack_id: &str) -> BusResult<()> {
        let mut inner = self.inner.lock().expect("bus lock");
        // Unknown ack ids are tolerated, matching provider semantics for
        // expired leases.
        inner.leased.remove(ack_id);
        Ok(())
    }

    async fn nack(&self, ack_id: &str) -> BusResult<()> {
        let mut inner = self.inner.lock().expect("bus lock");
        if let Some((subscription, message)) = inner.leased.remove(ack_id) {
            inner
                .queues
                .entry(subscription)
                .or_default()
                .push_front(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_fans_out_to_all_bound_subscriptions() {
        let bus = InMemoryBus::new();
        bus.create_subscription("uploads", "thumbnailers");
        bus.create_subscription("uploads", "moderators");

        bus.publish("uploads", BusMessage::new("k.png")).await.expect("publish");

        assert_eq!(bus.pending("thumbnailers"), 1);
        assert_eq!(bus.pending("moderators"), 1);
    }

    #[tokio::test]
    async fn ack_settles_and_nack_redelivers() {
        let bus = InMemoryBus::new();
        bus.create_subscription("uploads", "workers");
        bus.publish("uploads", BusMessage::new("k.png")).await.expect("publish");

        let subscriber = bus.subscriber("workers");
        let batch = subscriber.pull(10).await.expect("pull");
        assert_eq!(batch.len(), 1);
        assert_eq!(bus.pending("workers"), 0);

        subscriber.nack(&batch[0].ack_id).await.expect("nack");
        assert_eq!(bus.pending("workers"), 1);

        let batch = subscriber.pull(10).await.expect("pull");
        subscriber.acknowledge(&batch[0].ack_id).await.expect("ack");
        assert_eq!(bus.pending("workers"), 0);
        assert!(subscriber.pull(10).await.expect("pull").is_empty());
    }

    #[tokio::test]
    async fn pull_on_unknown_subscription_fails() {
        let bus = InMemoryBus::new();
        let subscriber = bus.subscriber("nope");
        assert!(matches!(
            subscriber.pull(1).await,
            Err(BusError::Unknown(_))
        ));
    }
}
