//! Persistence collaborator interfaces.
//!
//! The hub core only needs `create_message`; the remaining operations back the
//! room administration and join validation use cases.

use async_trait::async_trait;

use super::{
    entity::{Message, NewRoom, RoomInfo},
    error::RepositoryError,
    value_object::{MessageContent, MessageId, RoomId, Timestamp, UserId},
};

/// Message storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a message and return its durable id
    async fn create_message(
        &self,
        room: RoomId,
        user: UserId,
        content: &MessageContent,
        created_at: Timestamp,
    ) -> Result<MessageId, RepositoryError>;

    /// Messages of a room, oldest first
    async fn room_messages(&self, room: RoomId) -> Result<Vec<Message>, RepositoryError>;
}

/// Room and membership storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create_room(&self, room: NewRoom) -> Result<RoomInfo, RepositoryError>;

    async fn get_room(&self, id: RoomId) -> Result<Option<RoomInfo>, RepositoryError>;

    async fn list_rooms(&self) -> Result<Vec<RoomInfo>, RepositoryError>;

    /// Delete a room; `RoomNotFound` if it does not exist
    async fn delete_room(&self, id: RoomId) -> Result<(), RepositoryError>;

    /// Record that a user joined a room; `RoomNotFound` if it does not exist
    async fn add_member(&self, room: RoomId, user: UserId) -> Result<(), RepositoryError>;

    /// Users who ever joined the room, ascending; `RoomNotFound` if it does not exist
    async fn room_members(&self, room: RoomId) -> Result<Vec<UserId>, RepositoryError>;
}
