//! InMemory Message Repository 実装

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Message, MessageContent, MessageId, MessageRepository, RepositoryError, RoomId, Timestamp,
    UserId,
};

#[derive(Debug, Default)]
struct MessageStore {
    next_id: i64,
    messages: Vec<Message>,
}

/// インメモリ Message Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    store: Mutex<MessageStore>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_message(
        &self,
        room: RoomId,
        user: UserId,
        content: &MessageContent,
        created_at: Timestamp,
    ) -> Result<MessageId, RepositoryError> {
        let mut store = self.store.lock().await;
        store.next_id += 1;
        let id = MessageId::new(store.next_id)
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        store.messages.push(Message {
            id,
            room,
            user,
            content: content.clone(),
            created_at,
        });
        Ok(id)
    }

    async fn room_messages(&self, room: RoomId) -> Result<Vec<Message>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .messages
            .iter()
            .filter(|message| message.room == room)
            .cloned()
            .collect())
    }
}
