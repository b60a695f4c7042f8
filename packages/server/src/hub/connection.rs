//! ハブから見た1つのクライアントセッション
//!
//! ## 責務
//!
//! - 接続の識別子・ユーザー・ルームを保持する
//! - 有界の送信キューへの非ブロッキングな投入と、1回限りのクローズを提供する
//! - トランスポートのクローズシグナルを保持する
//!
//! ## 設計ノート
//!
//! 送信キューの送り手は `Mutex<Option<_>>` に入っており、最初のクローズで
//! 取り出されます。以降のクローズは何もしないため、登録解除・退去・
//! ルーム削除が重なってもキューは一度だけ閉じられます。

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{CloseSignal, ConnectionId, RoomId, UserId};

/// 送信キューの受け手。書き込みタスクが所有する
pub type OutboundReceiver = mpsc::Receiver<String>;

/// 送信キューへの非ブロッキングな投入の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// キューが満杯。受け手が止まっているか遅すぎる
    Full,
    /// キューが既に閉じているか、受け手がいない
    Closed,
}

/// ちょうど1つのルームに属するクライアントセッション
///
/// 送信キューはハブが書き込み、書き込みタスクが読み出す。
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    user: UserId,
    room: RoomId,
    outbound: Mutex<Option<mpsc::Sender<String>>>,
    transport: CloseSignal,
}

impl Connection {
    /// 容量 `capacity` の有界送信キューを持つ接続を作る。
    ///
    /// 容量 0 は 1 に切り上げる。
    pub fn new(user: UserId, room: RoomId, capacity: usize) -> (Arc<Self>, OutboundReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let connection = Arc::new(Self {
            id: ConnectionId::generate(),
            user,
            room,
            outbound: Mutex::new(Some(sender)),
            transport: CloseSignal::new(),
        });
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    /// トランスポートのクローズラッチ
    pub fn close_signal(&self) -> &CloseSignal {
        &self.transport
    }

    /// 待たずにペイロードの投入を試みる
    pub fn try_push(&self, payload: String) -> PushOutcome {
        let outbound = self.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        match outbound.as_ref() {
            None => PushOutcome::Closed,
            Some(sender) => match sender.try_send(payload) {
                Ok(()) => PushOutcome::Queued,
                Err(TrySendError::Full(_)) => PushOutcome::Full,
                Err(TrySendError::Closed(_)) => PushOutcome::Closed,
            },
        }
    }

    /// 送信キューを閉じる。
    ///
    /// 既に積まれたペイロードは、書き込みタスクがクローズを観測する前に届く。
    /// 実際に閉じた呼び出しだけが `true` を返す。
    pub fn close_outbound(&self) -> bool {
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub fn is_outbound_closed(&self) -> bool {
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// トランスポートを閉じる。実際に閉じた呼び出しだけが `true` を返す
    pub fn close_transport(&self) -> bool {
        self.transport.close()
    }
}
