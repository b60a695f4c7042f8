//! UseCase: ルーム管理
//!
//! ルームの作成・削除は永続化層とハブの両方に反映します。
//! ハブ側の操作はイベントループを経由せず、レジストリのロックで直接行われます。

use std::sync::Arc;

use huddle_shared::time::Clock;

use crate::{
    domain::{Message, MessageRepository, NewRoom, RoomId, RoomInfo, RoomRepository, Timestamp, UserId},
    hub::{Hub, RoomSnapshot},
};

use super::error::RoomAdminError;

/// Maximum number of characters in a room name
pub const ROOM_NAME_MAX_CHARS: usize = 100;

/// Stored room metadata plus its live hub state, if the room is in the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDetail {
    pub info: RoomInfo,
    pub live: Option<RoomSnapshot>,
}

/// ルーム管理のユースケース
pub struct RoomAdminUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    hub: Hub,
    clock: Arc<dyn Clock>,
}

impl RoomAdminUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        hub: Hub,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            messages,
            hub,
            clock,
        }
    }

    /// Store a new room and open it in the hub ahead of any client joining
    pub async fn create_room(
        &self,
        name: String,
        description: String,
        created_by: UserId,
    ) -> Result<RoomInfo, RoomAdminError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(RoomAdminError::InvalidName("name is empty"));
        }
        if name.chars().count() > ROOM_NAME_MAX_CHARS {
            return Err(RoomAdminError::InvalidName("name is too long"));
        }

        let info = self
            .rooms
            .create_room(NewRoom {
                name,
                description,
                created_by,
                created_at: Timestamp::new(self.clock.now_millis()),
            })
            .await?;
        self.hub.create_room(info.id, Some(info.clone())).await;
        Ok(info)
    }

    /// Delete a room and disconnect everyone in it
    pub async fn remove_room(&self, id: RoomId) -> Result<(), RoomAdminError> {
        self.rooms.delete_room(id).await?;
        self.hub.remove_room(id).await;
        Ok(())
    }

    pub async fn room_detail(&self, id: RoomId) -> Result<RoomDetail, RoomAdminError> {
        let info = self
            .rooms
            .get_room(id)
            .await?
            .ok_or(RoomAdminError::RoomNotFound(id))?;
        let live = self.hub.get_room(id).await;
        Ok(RoomDetail { info, live })
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomInfo>, RoomAdminError> {
        Ok(self.rooms.list_rooms().await?)
    }

    /// Users who joined the room, ascending
    pub async fn room_members(&self, id: RoomId) -> Result<Vec<UserId>, RoomAdminError> {
        Ok(self.rooms.room_members(id).await?)
    }

    /// Message history of a room, oldest first
    pub async fn room_messages(&self, id: RoomId) -> Result<Vec<Message>, RoomAdminError> {
        if self.rooms.get_room(id).await?.is_none() {
            return Err(RoomAdminError::RoomNotFound(id));
        }
        Ok(self.messages.room_messages(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use huddle_shared::time::FixedClock;

    use super::*;
    use crate::{
        domain::MessageContent,
        hub::{HubConfig, RoomOrigin},
        infrastructure::repository::{InMemoryMessageRepository, InMemoryRoomRepository},
    };

    struct Fixture {
        usecase: RoomAdminUseCase,
        hub: Hub,
        messages: Arc<InMemoryMessageRepository>,
    }

    fn fixture() -> Fixture {
        let (hub, _event_loop) = Hub::spawn(HubConfig::default());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let usecase = RoomAdminUseCase::new(
            Arc::new(InMemoryRoomRepository::new()),
            messages.clone(),
            hub.clone(),
            Arc::new(FixedClock::new(1000)),
        );
        Fixture {
            usecase,
            hub,
            messages,
        }
    }

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_opens_it_in_hub() {
        // テスト項目: 作成したルームは接続 0 のままハブに存在する
        // given (前提条件):
        let f = fixture();

        // when (操作):
        let info = f
            .usecase
            .create_room("  general ".to_string(), "chat".to_string(), user(1))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(info.name, "general");
        assert_eq!(info.created_at, Timestamp::new(1000));
        let snapshot = f.hub.get_room(info.id).await.unwrap();
        assert_eq!(snapshot.origin, RoomOrigin::Administrative);
        assert_eq!(snapshot.connection_count, 0);
        assert_eq!(snapshot.info, Some(info));
    }

    #[tokio::test]
    async fn test_create_room_rejects_blank_name() {
        // テスト項目: 空のルーム名は拒否される
        // given (前提条件):
        let f = fixture();

        // when (操作):
        let result = f
            .usecase
            .create_room("   ".to_string(), String::new(), user(1))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomAdminError::InvalidName("name is empty")));
        assert!(f.hub.room_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_room_disconnects_clients() {
        // テスト項目: ルーム削除で接続が閉じられ、ハブからも消える
        // given (前提条件):
        let f = fixture();
        let info = f
            .usecase
            .create_room("general".to_string(), String::new(), user(1))
            .await
            .unwrap();
        let (connection, mut outbound) = f.hub.open_connection(user(2), info.id);
        f.hub.register(connection.clone()).await.unwrap();
        f.hub.flush().await.unwrap();

        // when (操作):
        f.usecase.remove_room(info.id).await.unwrap();

        // then (期待する結果):
        assert!(!f.hub.has_room(info.id).await);
        assert!(connection.close_signal().is_closed());
        assert_eq!(outbound.recv().await, None);
        assert_eq!(
            f.usecase.room_detail(info.id).await,
            Err(RoomAdminError::RoomNotFound(info.id))
        );
        assert_eq!(
            f.usecase.remove_room(info.id).await,
            Err(RoomAdminError::RoomNotFound(info.id))
        );
    }

    #[tokio::test]
    async fn test_room_detail_and_history() {
        // テスト項目: ルーム詳細にライブ状態が含まれ、履歴が取得できる
        // given (前提条件):
        let f = fixture();
        let info = f
            .usecase
            .create_room("general".to_string(), String::new(), user(1))
            .await
            .unwrap();
        f.messages
            .create_message(
                info.id,
                user(1),
                &MessageContent::new("hello".to_string()).unwrap(),
                Timestamp::new(1000),
            )
            .await
            .unwrap();

        // when (操作):
        let detail = f.usecase.room_detail(info.id).await.unwrap();
        let history = f.usecase.room_messages(info.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(detail.info, info);
        assert_eq!(detail.live.map(|live| live.connection_count), Some(0));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content.as_str(), "hello");
        assert_eq!(f.usecase.list_rooms().await.unwrap(), vec![info]);
    }

    #[tokio::test]
    async fn test_room_members_reflect_joins() {
        // テスト項目: 参加したユーザーがメンバー一覧に ID 順で含まれる
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let (hub, _event_loop) = Hub::spawn(HubConfig::default());
        let usecase = RoomAdminUseCase::new(
            rooms.clone(),
            Arc::new(InMemoryMessageRepository::new()),
            hub,
            Arc::new(FixedClock::new(1000)),
        );
        let info = usecase
            .create_room("general".to_string(), String::new(), user(3))
            .await
            .unwrap();

        // when (操作):
        rooms.add_member(info.id, user(7)).await.unwrap();
        rooms.add_member(info.id, user(1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            usecase.room_members(info.id).await.unwrap(),
            vec![user(1), user(3), user(7)]
        );
        let unknown = RoomId::new(99).unwrap();
        assert_eq!(
            usecase.room_members(unknown).await,
            Err(RoomAdminError::RoomNotFound(unknown))
        );
    }
}
