//! InMemory Room Repository 実装
//!
//! ルームのメタデータとメンバーシップを BTreeMap / BTreeSet で保持します。

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{NewRoom, RepositoryError, RoomId, RoomInfo, RoomRepository, UserId};

#[derive(Debug)]
struct StoredRoom {
    info: RoomInfo,
    members: BTreeSet<UserId>,
}

#[derive(Debug, Default)]
struct RoomStore {
    next_id: i64,
    rooms: BTreeMap<RoomId, StoredRoom>,
}

/// インメモリ Room Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    store: Mutex<RoomStore>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, room: NewRoom) -> Result<RoomInfo, RepositoryError> {
        let mut store = self.store.lock().await;
        store.next_id += 1;
        let id = RoomId::new(store.next_id)
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let info = RoomInfo {
            id,
            name: room.name,
            description: room.description,
            created_by: room.created_by,
            created_at: room.created_at,
        };
        store.rooms.insert(
            id,
            StoredRoom {
                info: info.clone(),
                members: BTreeSet::from([room.created_by]),
            },
        );
        Ok(info)
    }

    async fn get_room(&self, id: RoomId) -> Result<Option<RoomInfo>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.rooms.get(&id).map(|stored| stored.info.clone()))
    }

    async fn list_rooms(&self) -> Result<Vec<RoomInfo>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .rooms
            .values()
            .map(|stored| stored.info.clone())
            .collect())
    }

    async fn delete_room(&self, id: RoomId) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        store
            .rooms
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::RoomNotFound(id))
    }

    async fn add_member(&self, room: RoomId, user: UserId) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        let stored = store
            .rooms
            .get_mut(&room)
            .ok_or(RepositoryError::RoomNotFound(room))?;
        stored.members.insert(user);
        Ok(())
    }

    async fn room_members(&self, room: RoomId) -> Result<Vec<UserId>, RepositoryError> {
        let store = self.store.lock().await;
        store
            .rooms
            .get(&room)
            .map(|stored| stored.members.iter().copied().collect())
            .ok_or(RepositoryError::RoomNotFound(room))
    }
}
