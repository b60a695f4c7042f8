//! 接続ごとの読み取りタスクと書き込みタスク
//!
//! ## 責務
//!
//! - 読み取りタスク: 受信ペイロードを `MessageContent` に検証し、
//!   [`SendMessageUseCase`] で保存・配送する。トランスポートが終わったら
//!   ハブから登録解除し、トランスポートを閉じる
//! - 書き込みタスク: 送信キューを順にトランスポートへ書き出し、キューが
//!   閉じられたら close フレームを送る（ベストエフォート）
//!
//! ## 設計ノート
//!
//! 両タスクは接続の [`CloseSignal`](crate::domain::CloseSignal) を監視します。
//! ルーム削除や遅い接続の退去ではハブがこのシグナルを閉じるため、
//! 書き込みが詰まっていても両タスクが終了し、読み取りタスクの登録解除を経て
//! 遅延作成されたルームも片付けられます。

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{MessageContent, TransportReceiver, TransportSender},
    hub::{Connection, Hub, OutboundReceiver},
    usecase::{SendMessageError, SendMessageUseCase},
};

/// close フレーム送信の待ち時間の上限
pub const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// 登録済みの接続を、両タスクが終了するまで駆動する
pub async fn run_connection<R, W>(
    hub: Hub,
    send_message: Arc<SendMessageUseCase>,
    connection: Arc<Connection>,
    outbound: OutboundReceiver,
    reader: R,
    writer: W,
) where
    R: TransportReceiver + 'static,
    W: TransportSender + 'static,
{
    let write_task = tokio::spawn(write_loop(connection.clone(), outbound, writer));
    read_loop(&hub, &send_message, &connection, reader).await;

    if let Err(e) = write_task.await {
        tracing::error!(connection = %connection.id(), "Write task failed: {}", e);
    }
    tracing::info!(
        connection = %connection.id(),
        user = %connection.user(),
        room = %connection.room(),
        "Connection closed"
    );
}

async fn read_loop<R: TransportReceiver>(
    hub: &Hub,
    send_message: &SendMessageUseCase,
    connection: &Arc<Connection>,
    mut reader: R,
) {
    let close = connection.close_signal().clone();
    loop {
        let frame = tokio::select! {
            _ = close.closed() => break,
            frame = reader.receive() => frame,
        };

        let payload = match frame {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => {
                tracing::warn!(connection = %connection.id(), "Read failed: {}", e);
                break;
            }
            None => {
                tracing::debug!(connection = %connection.id(), "Peer closed the transport");
                break;
            }
        };

        let content = match MessageContent::new(payload) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(connection = %connection.id(), "Dropping inbound payload: {}", e);
                continue;
            }
        };

        match send_message
            .execute(connection.room(), connection.user(), content)
            .await
        {
            Ok(message) => {
                tracing::debug!(
                    message = %message.id,
                    room = %message.room,
                    user = %message.user,
                    "Message sent"
                );
            }
            Err(SendMessageError::HubUnavailable(e)) => {
                tracing::error!(connection = %connection.id(), "Stopping read task: {}", e);
                break;
            }
            Err(e) => {
                tracing::warn!(connection = %connection.id(), "{}", e);
            }
        }
    }

    if let Err(e) = hub.unregister(connection.clone()).await {
        tracing::warn!(connection = %connection.id(), "Unregister skipped: {}", e);
    }
    connection.close_transport();
}

async fn write_loop<W: TransportSender>(
    connection: Arc<Connection>,
    mut outbound: OutboundReceiver,
    mut writer: W,
) {
    let close = connection.close_signal().clone();
    loop {
        // トランスポートを閉じる前に、キューに残ったペイロードを書き出す
        let payload = tokio::select! {
            biased;
            payload = outbound.recv() => payload,
            _ = close.closed() => None,
        };

        let Some(payload) = payload else {
            match tokio::time::timeout(CLOSE_FRAME_TIMEOUT, writer.send_close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!(connection = %connection.id(), "Close frame not sent: {}", e);
                }
                Err(_) => {
                    tracing::debug!(connection = %connection.id(), "Close frame timed out");
                }
            }
            break;
        };

        // 詰まった書き込みはトランスポートが閉じられた時点で諦める
        let sent = tokio::select! {
            biased;
            sent = writer.send(payload) => sent,
            _ = close.closed() => {
                tracing::warn!(connection = %connection.id(), "Abandoning stalled write");
                break;
            }
        };
        if let Err(e) = sent {
            tracing::warn!(connection = %connection.id(), "Write failed: {}", e);
            break;
        }
    }
    connection.close_transport();
}
