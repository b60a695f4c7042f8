//! Message bus interfaces.
//!
//! The bus carries opaque byte records on named topics. Records published by one
//! backend instance are re-broadcast by every instance subscribed to the topic.

use async_trait::async_trait;

use super::{entity::Message, error::BusError};

/// External pub/sub transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, topic: &str, record: Vec<u8>) -> Result<(), BusError>;

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn BusSubscription>, BusError>;
}

/// A live subscription to one topic
#[async_trait]
pub trait BusSubscription: Send {
    /// Next record on the topic.
    ///
    /// `None` means the subscription ended and has to be re-established.
    async fn next_record(&mut self) -> Option<Vec<u8>>;
}

/// Outbound side of the bus bridge, as seen by the use cases
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, message: &Message) -> Result<(), BusError>;
}
