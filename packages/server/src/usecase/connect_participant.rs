//! UseCase: 参加者接続処理
//!
//! 接続の受け入れは2段階で行います：
//! 1. `validate` - プロトコルのアップグレード前にルームを検証し、メンバーとして記録
//! 2. `register` - アップグレード成功後に Connection を作成してハブに登録

use std::sync::Arc;

use crate::{
    domain::{RoomId, RoomRepository, UserId},
    hub::{Connection, Hub, OutboundReceiver},
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    rooms: Arc<dyn RoomRepository>,
    hub: Hub,
}

impl ConnectParticipantUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, hub: Hub) -> Self {
        Self { rooms, hub }
    }

    /// Check that the room exists and record the user as a member
    pub async fn validate(&self, room: RoomId, user: UserId) -> Result<(), ConnectError> {
        if self.rooms.get_room(room).await?.is_none() {
            return Err(ConnectError::RoomNotFound(room));
        }
        self.rooms.add_member(room, user).await?;
        Ok(())
    }

    /// Create the connection and register it with the hub
    pub async fn register(
        &self,
        room: RoomId,
        user: UserId,
    ) -> Result<(Arc<Connection>, OutboundReceiver), ConnectError> {
        let (connection, outbound) = self.hub.open_connection(user, room);
        self.hub.register(connection.clone()).await?;
        Ok((connection, outbound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{NewRoom, RepositoryError, Timestamp, repository::MockRoomRepository},
        hub::HubConfig,
        infrastructure::repository::InMemoryRoomRepository,
    };

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_validate_and_register() {
        // テスト項目: 存在するルームへの接続が検証され、ハブに登録される
        // given (前提条件):
        let repo = Arc::new(InMemoryRoomRepository::new());
        let info = repo
            .create_room(NewRoom {
                name: "general".to_string(),
                description: String::new(),
                created_by: user(1),
                created_at: Timestamp::new(1000),
            })
            .await
            .unwrap();
        let (hub, _event_loop) = Hub::spawn(HubConfig::default());
        let usecase = ConnectParticipantUseCase::new(repo.clone(), hub.clone());

        // when (操作):
        usecase.validate(info.id, user(2)).await.unwrap();
        let (connection, _outbound) = usecase.register(info.id, user(2)).await.unwrap();
        hub.flush().await.unwrap();

        // then (期待する結果):
        assert_eq!(connection.room(), info.id);
        assert_eq!(connection.user(), user(2));
        assert_eq!(hub.room_client_count(info.id).await, 1);
        assert_eq!(
            repo.room_members(info.id).await.unwrap(),
            vec![user(1), user(2)]
        );
    }

    #[tokio::test]
    async fn test_validate_unknown_room() {
        // テスト項目: 存在しないルームへの接続は RoomNotFound で拒否される
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms.expect_get_room().times(1).returning(|_| Ok(None));
        rooms.expect_add_member().never();
        let (hub, _event_loop) = Hub::spawn(HubConfig::default());
        let usecase = ConnectParticipantUseCase::new(Arc::new(rooms), hub);
        let room = RoomId::new(9).unwrap();

        // when (操作):
        let result = usecase.validate(room, user(1)).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::RoomNotFound(room)));
    }

    #[tokio::test]
    async fn test_validate_storage_failure() {
        // テスト項目: ストレージ障害は Repository エラーとして返される
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_get_room()
            .returning(|_| Err(RepositoryError::Unavailable("timeout".to_string())));
        let (hub, _event_loop) = Hub::spawn(HubConfig::default());
        let usecase = ConnectParticipantUseCase::new(Arc::new(rooms), hub);

        // when (操作):
        let result = usecase.validate(RoomId::new(1).unwrap(), user(1)).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::Repository(RepositoryError::Unavailable(
                "timeout".to_string()
            )))
        );
    }
}
