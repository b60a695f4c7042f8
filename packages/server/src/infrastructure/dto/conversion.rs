//! Conversion logic between DTOs and domain entities.

use huddle_shared::time::timestamp_to_rfc3339;
use thiserror::Error;

use crate::domain::{
    Message, MessageContent, MessageId, RoomId, RoomInfo, Timestamp, UserId, ValueObjectError,
};

use super::{
    bus::MessageRecord,
    http::{MessageDto, RoomDto},
};

/// A record that parsed but does not describe a valid message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid message record: {0}")]
pub struct DecodeError(#[from] pub ValueObjectError);

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<MessageRecord> for Message {
    type Error = DecodeError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::new(record.id)?,
            room: RoomId::new(record.room)?,
            user: UserId::new(record.user)?,
            content: MessageContent::new(record.content)?,
            created_at: Timestamp::new(record.created_at),
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            room: message.room.value(),
            user: message.user.value(),
            content: message.content.as_str().to_string(),
            created_at: message.created_at.value(),
        }
    }
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            room: message.room.value(),
            user: message.user.value(),
            content: message.content.as_str().to_string(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
        }
    }
}

impl From<&RoomInfo> for RoomDto {
    fn from(room: &RoomInfo) -> Self {
        Self {
            id: room.id.value(),
            name: room.name.clone(),
            description: room.description.clone(),
            created_by: room.created_by.value(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}
