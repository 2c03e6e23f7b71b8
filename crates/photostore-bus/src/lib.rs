//! Photostore Bus Library
//!
//! Publish/subscribe plumbing for the pipeline: the message model, publisher
//! and subscriber traits, the per-message `Disposition` contract, a Google
//! Pub/Sub REST backend, an in-process backend for tests, and the subscriber
//! run loop shared by both workers.

pub mod memory;
pub mod message;
pub mod pubsub;
pub mod run;
pub mod traits;

pub use memory::InMemoryBus;
pub use message::{BusMessage, ObjectNotification, EVENT_TYPE_ATTRIBUTE, OBJECT_FINALIZE,
    OVERWROTE_GENERATION_ATTRIBUTE};
pub use pubsub::{PubSubPublisher, PubSubSubscriber};
pub use run::run_subscriber;
pub use traits::{
    BusError, BusResult, DeliveredMessage, Disposition, MessageHandler, Publisher, Subscriber,
};
