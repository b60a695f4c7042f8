//! Domain error types.

use thiserror::Error;

use super::value_object::RoomId;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Identifier must be a positive integer
    #[error("{kind} must be positive, got {value}")]
    NonPositiveId { kind: &'static str, value: i64 },

    /// Message content is empty or whitespace only
    #[error("message content is empty")]
    EmptyContent,

    /// Message content exceeds the maximum length
    #[error("message content is too long: {len} characters (max {max})")]
    ContentTooLong { len: usize, max: usize },
}

/// Persistence collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Message bus errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("failed to encode bus record: {0}")]
    Encode(String),

    #[error("failed to publish to topic '{topic}': {reason}")]
    Publish { topic: String, reason: String },

    #[error("failed to subscribe to topic '{topic}': {reason}")]
    Subscribe { topic: String, reason: String },
}

/// Duplex transport errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("receive failed: {0}")]
    Receive(String),

    #[error("send failed: {0}")]
    Send(String),
}
