//! Domain entities.

use super::value_object::{MessageContent, MessageId, RoomId, Timestamp, UserId};

/// An immutable chat message
///
/// Produced either by a connection's read task (local origin) or by the bus
/// inbound adapter (remote origin). The hub does not distinguish the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room: RoomId,
    pub user: UserId,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

/// Room metadata owned by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

/// Attributes of a room that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
}
