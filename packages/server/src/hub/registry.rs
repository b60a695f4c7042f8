//! ルームレジストリ: ルーム ID から、そのルームにいる接続への対応
//!
//! ## 責務
//!
//! - ルームの遅延作成と管理操作による作成・削除
//! - 接続の追加・削除と、空になった遅延作成ルームの片付け
//! - ルーム内の全接続へのペイロード配送と、詰まった接続の退去
//!
//! ## 設計ノート
//!
//! レジストリ全体のロックがルームの対応表を、ルームごとのロックが接続集合を
//! 守ります。どの経路もレジストリのロックを先に、ルームのロックを後に取ります。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::domain::{ConnectionId, RoomId, RoomInfo};

use super::connection::{Connection, PushOutcome};

/// ルームがレジストリに入った経緯
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOrigin {
    /// 最初の登録で作られ、最後の接続の登録解除で削除される
    Lazy,
    /// ルーム管理で作られ、明示的にのみ削除される
    Administrative,
}

/// ハブが持つ1ルーム分の記録
#[derive(Debug)]
pub struct RoomEntry {
    id: RoomId,
    info: Option<RoomInfo>,
    origin: RoomOrigin,
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl RoomEntry {
    fn new(id: RoomId, info: Option<RoomInfo>, origin: RoomOrigin) -> Self {
        Self {
            id,
            info,
            origin,
            connections: RwLock::new(HashMap::new()),
        }
    }
}

/// ある時点のルームの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub info: Option<RoomInfo>,
    pub origin: RoomOrigin,
    pub connection_count: usize,
}

/// 登録解除の経路で接続を取り除いた結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removal {
    /// 接続がルームに存在した
    pub removed: bool,
    /// ルームが空になり削除された
    pub room_deleted: bool,
}

/// 1ルームへの配送の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub evicted: Vec<ConnectionId>,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<RoomEntry>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をルームに追加する。ルームがなければ遅延作成する。
    ///
    /// ルームを作成した場合に `true` を返す。
    pub async fn insert_connection(&self, connection: Arc<Connection>) -> bool {
        let mut rooms = self.rooms.write().await;
        let mut created = false;
        let entry = rooms
            .entry(connection.room())
            .or_insert_with(|| {
                created = true;
                Arc::new(RoomEntry::new(connection.room(), None, RoomOrigin::Lazy))
            })
            .clone();
        entry
            .connections
            .write()
            .await
            .insert(connection.id(), connection);
        created
    }

    /// 接続をルームから取り除き、送信キューを閉じる。
    ///
    /// 退去済みやルーム削除済みで登録が残っていなくてもキューは閉じる。
    /// 空になった遅延作成ルームは削除し、管理ルームは接続 0 のまま残す。
    pub async fn remove_connection(&self, connection: &Connection) -> Removal {
        let mut rooms = self.rooms.write().await;
        let mut removal = Removal::default();

        if let Some(entry) = rooms.get(&connection.room()).cloned() {
            let mut connections = entry.connections.write().await;
            removal.removed = connections.remove(&connection.id()).is_some();
            connection.close_outbound();

            if connections.is_empty() && entry.origin == RoomOrigin::Lazy {
                drop(connections);
                rooms.remove(&connection.room());
                removal.room_deleted = true;
            }
        } else {
            connection.close_outbound();
        }

        removal
    }

    /// ルーム内の全接続にペイロードを投入する。
    ///
    /// キューが満杯、または受け手がいない接続はその場で退去させる。
    /// キューとトランスポートを閉じ、ルームから取り除く。
    pub async fn deliver(&self, room: RoomId, payload: &str) -> DeliveryReport {
        let rooms = self.rooms.read().await;
        let mut report = DeliveryReport::default();

        let Some(entry) = rooms.get(&room) else {
            return report;
        };

        let mut connections = entry.connections.write().await;
        for (id, connection) in connections.iter() {
            match connection.try_push(payload.to_string()) {
                PushOutcome::Queued => report.delivered += 1,
                PushOutcome::Full | PushOutcome::Closed => {
                    connection.close_outbound();
                    connection.close_transport();
                    report.evicted.push(*id);
                }
            }
        }
        for id in &report.evicted {
            connections.remove(id);
        }

        report
    }

    /// 空の管理ルームを作る。既にあれば何もしない。
    ///
    /// 作成した場合に `true` を返す。
    pub async fn create_room(&self, id: RoomId, info: Option<RoomInfo>) -> bool {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&id) {
            return false;
        }
        rooms.insert(
            id,
            Arc::new(RoomEntry::new(id, info, RoomOrigin::Administrative)),
        );
        true
    }

    /// ルーム内の全接続を強制的に閉じ、ルームを削除する。
    ///
    /// 閉じた接続数を返す。ルームがなければ `None`。
    pub async fn remove_room(&self, id: RoomId) -> Option<usize> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.get(&id).cloned()?;

        let closed = {
            let mut connections = entry.connections.write().await;
            for connection in connections.values() {
                connection.close_outbound();
                connection.close_transport();
            }
            let closed = connections.len();
            connections.clear();
            closed
        };

        rooms.remove(&id);
        Some(closed)
    }

    pub async fn snapshot(&self, id: RoomId) -> Option<RoomSnapshot> {
        let rooms = self.rooms.read().await;
        let entry = rooms.get(&id)?;
        let connection_count = entry.connections.read().await.len();
        Some(RoomSnapshot {
            id: entry.id,
            info: entry.info.clone(),
            origin: entry.origin,
            connection_count,
        })
    }

    pub async fn contains(&self, id: RoomId) -> bool {
        self.rooms.read().await.contains_key(&id)
    }

    /// ルーム内の接続数。未知のルームは 0
    pub async fn connection_count(&self, id: RoomId) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(&id) {
            Some(entry) => entry.connections.read().await.len(),
            None => 0,
        }
    }

    /// レジストリにある全ルームの ID（昇順）
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
