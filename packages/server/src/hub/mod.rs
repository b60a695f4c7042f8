//! 接続ハブ
//!
//! ## 責務
//!
//! - プロセス内のルームと接続の対応を管理する
//! - 登録・登録解除・配送のイベントを到着順に適用する
//! - ルームの作成・削除・参照を提供する
//!
//! ## 設計ノート
//!
//! [`Hub`] は起動時に一度だけ作られ、必要なコンポーネントへ明示的に渡されます。
//! 登録・登録解除・配送は単一の順序付きチャネルを通り、[`HubLoop`] が
//! 1件ずつ処理するため全順序が保たれます。ルーム管理はイベントループを経由せず、
//! [`RoomRegistry`] のロックの下で直接実行されます。

mod connection;
mod registry;

use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{Message, RoomId, RoomInfo, UserId};

pub use connection::{Connection, OutboundReceiver, PushOutcome};
pub use registry::{DeliveryReport, Removal, RoomOrigin, RoomRegistry, RoomSnapshot};

/// 接続ごとの送信キューの既定容量
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;
/// ハブの受付チャネルの既定容量
pub const DEFAULT_INTAKE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// 受付チャネルが保持できる未処理イベント数。超えると送り手が待つ
    pub intake_capacity: usize,
    /// 接続ごとの未送信ペイロード数の上限。超えた接続は退去させられる
    pub outbound_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("hub event loop is no longer running")]
    Closed,
}

/// ハブのイベントループが到着順に処理するイベント
#[derive(Debug)]
pub enum HubEvent {
    Register(Arc<Connection>),
    Unregister(Arc<Connection>),
    Broadcast(Arc<Message>),
    /// それ以前のイベントがすべて処理されたら完了する
    Flush(oneshot::Sender<()>),
}

/// ハブへの複製可能なハンドル
#[derive(Debug, Clone)]
pub struct Hub {
    registry: Arc<RoomRegistry>,
    intake: mpsc::Sender<HubEvent>,
    outbound_capacity: usize,
}

impl Hub {
    /// ハブとイベントループを作る。ループは [`HubLoop::run`] で駆動すること
    pub fn new(config: HubConfig) -> (Self, HubLoop) {
        let registry = Arc::new(RoomRegistry::new());
        let (intake, events) = mpsc::channel(config.intake_capacity.max(1));
        let hub = Self {
            registry: registry.clone(),
            intake,
            outbound_capacity: config.outbound_capacity,
        };
        (hub, HubLoop { registry, events })
    }

    /// ハブを作り、イベントループを現在のランタイムで起動する
    pub fn spawn(config: HubConfig) -> (Self, JoinHandle<()>) {
        let (hub, event_loop) = Self::new(config);
        (hub, tokio::spawn(event_loop.run()))
    }

    /// 設定された送信キュー容量で接続を作る。
    ///
    /// この時点ではまだ登録されない。
    pub fn open_connection(&self, user: UserId, room: RoomId) -> (Arc<Connection>, OutboundReceiver) {
        Connection::new(user, room, self.outbound_capacity)
    }

    /// 接続の登録をキューに積む。
    ///
    /// これが返った後に積まれた配送は、登録の後に処理される。
    pub async fn register(&self, connection: Arc<Connection>) -> Result<(), HubError> {
        self.submit(HubEvent::Register(connection)).await
    }

    /// 接続の登録解除をキューに積む。送信キューはちょうど1回だけ閉じられる
    pub async fn unregister(&self, connection: Arc<Connection>) -> Result<(), HubError> {
        self.submit(HubEvent::Unregister(connection)).await
    }

    /// `message.room` の全接続への配送をキューに積む
    pub async fn broadcast(&self, message: Message) -> Result<(), HubError> {
        self.submit(HubEvent::Broadcast(Arc::new(message))).await
    }

    /// この呼び出しより前に積まれたイベントがすべて処理されるまで待つ
    pub async fn flush(&self) -> Result<(), HubError> {
        let (done, processed) = oneshot::channel();
        self.submit(HubEvent::Flush(done)).await?;
        processed.await.map_err(|_| HubError::Closed)
    }

    /// 削除されるまで残る空のルームを作る。既にあれば何もしない
    pub async fn create_room(&self, id: RoomId, info: Option<RoomInfo>) -> bool {
        let created = self.registry.create_room(id, info).await;
        if created {
            tracing::info!(room = %id, "Room created in hub");
        }
        created
    }

    /// ルーム内の全接続を強制的に閉じ、ルームを削除する。
    ///
    /// ルームが存在しなければ `false` を返す。
    pub async fn remove_room(&self, id: RoomId) -> bool {
        match self.registry.remove_room(id).await {
            Some(closed) => {
                tracing::info!(room = %id, closed, "Room removed from hub");
                true
            }
            None => false,
        }
    }

    pub async fn get_room(&self, id: RoomId) -> Option<RoomSnapshot> {
        self.registry.snapshot(id).await
    }

    pub async fn has_room(&self, id: RoomId) -> bool {
        self.registry.contains(id).await
    }

    pub async fn room_client_count(&self, id: RoomId) -> usize {
        self.registry.connection_count(id).await
    }

    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.registry.room_ids().await
    }

    async fn submit(&self, event: HubEvent) -> Result<(), HubError> {
        self.intake.send(event).await.map_err(|_| HubError::Closed)
    }
}

/// ハブの直列化されたイベントループ
#[derive(Debug)]
pub struct HubLoop {
    registry: Arc<RoomRegistry>,
    events: mpsc::Receiver<HubEvent>,
}

impl HubLoop {
    /// すべての [`Hub`] ハンドルが破棄されるまでイベントを処理する
    pub async fn run(mut self) {
        tracing::info!("Hub event loop started");
        while let Some(event) = self.events.recv().await {
            self.handle(event).await;
        }
        tracing::info!("Hub event loop stopped");
    }

    async fn handle(&self, event: HubEvent) {
        match event {
            HubEvent::Register(connection) => {
                let room_created = self.registry.insert_connection(connection.clone()).await;
                tracing::info!(
                    connection = %connection.id(),
                    user = %connection.user(),
                    room = %connection.room(),
                    room_created,
                    "Connection registered"
                );
            }
            HubEvent::Unregister(connection) => {
                let removal = self.registry.remove_connection(&connection).await;
                tracing::info!(
                    connection = %connection.id(),
                    room = %connection.room(),
                    was_registered = removal.removed,
                    room_deleted = removal.room_deleted,
                    "Connection unregistered"
                );
            }
            HubEvent::Broadcast(message) => {
                let report = self
                    .registry
                    .deliver(message.room, message.content.as_str())
                    .await;
                for connection in &report.evicted {
                    tracing::warn!(
                        connection = %connection,
                        room = %message.room,
                        "Evicted slow connection: outbound queue full"
                    );
                }
                tracing::debug!(
                    message = %message.id,
                    room = %message.room,
                    delivered = report.delivered,
                    evicted = report.evicted.len(),
                    "Broadcast message"
                );
            }
            HubEvent::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
