//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → ハブへのブロードキャスト → バスへの publish の順序
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージはブロードキャストされないことを保証
//! - バスへの publish 失敗がローカル配送を取り消さないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存・配送・publish がすべて成功
//! - 異常系：永続化失敗、publish 失敗

use std::sync::Arc;

use huddle_shared::time::Clock;

use crate::{
    domain::{
        Message, MessageContent, MessagePublisher, MessageRepository, RoomId, Timestamp, UserId,
    },
    hub::Hub,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// MessageRepository（永続化の抽象化）
    messages: Arc<dyn MessageRepository>,
    /// Hub（ローカル配送）
    hub: Hub,
    /// MessagePublisher（他インスタンスへの配送）
    publisher: Arc<dyn MessagePublisher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        hub: Hub,
        publisher: Arc<dyn MessagePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            messages,
            hub,
            publisher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 保存され、ローカルに配送され、バスに publish されたメッセージ
    /// * `Err(SendMessageError::Persistence)` - 保存失敗（何も配送されない）
    /// * `Err(SendMessageError::Publish)` - 保存・ローカル配送は完了、publish のみ失敗
    pub async fn execute(
        &self,
        room: RoomId,
        user: UserId,
        content: MessageContent,
    ) -> Result<Message, SendMessageError> {
        let created_at = Timestamp::new(self.clock.now_millis());

        // 1. 永続化して ID を得る
        let id = self
            .messages
            .create_message(room, user, &content, created_at)
            .await
            .map_err(SendMessageError::Persistence)?;

        let message = Message {
            id,
            room,
            user,
            content,
            created_at,
        };

        // 2. ローカルのハブでブロードキャスト
        self.hub.broadcast(message.clone()).await?;

        // 3. 他インスタンス向けにバスへ publish（失敗してもロールバックしない）
        if let Err(source) = self.publisher.publish(&message).await {
            return Err(SendMessageError::Publish {
                message: Box::new(message),
                source,
            });
        }

        Ok(message)
    }
}
