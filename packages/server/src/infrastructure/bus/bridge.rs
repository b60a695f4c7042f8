//! バスブリッジ: ハブと外部メッセージバスの間のアダプター
//!
//! ## 責務
//!
//! - [`BusPublisher`]（送信側）: このインスタンスで作られたメッセージを他インスタンス向けに発行する
//! - [`BusSubscriber`]（受信側）: トピックのレコードをデコードし `Hub::broadcast` に渡す
//!
//! ## 設計ノート
//!
//! レコードは `{origin, message}` のエンベロープで運ばれます。自インスタンスが
//! 発行したレコードは作成時に配送済みなのでスキップします。デコードできない
//! レコードは警告ログを出して破棄し、配送はしません。

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::{
    domain::{BusError, BusSubscription, InstanceId, Message, MessageBus, MessageId, MessagePublisher},
    hub::{Hub, HubError},
    infrastructure::dto::{
        DecodeError,
        bus::{BusEnvelope, MessageRecord},
    },
};

/// チャットメッセージを運ぶ既定のトピック
pub const DEFAULT_TOPIC: &str = "messages";
/// 購読が終了・失敗した後、再購読するまでの既定の待ち時間
pub const DEFAULT_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum BusBridgeError {
    #[error("malformed bus record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DecodeError),

    #[error(transparent)]
    Hub(#[from] HubError),
}

/// 受信側がレコードをどう扱ったか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    Broadcast(MessageId),
    /// 自インスタンスの発行分。ローカルでは配送済み
    SkippedOwnOrigin,
}

/// 送信側アダプター
pub struct BusPublisher {
    bus: Arc<dyn MessageBus>,
    topic: String,
    origin: InstanceId,
}

impl BusPublisher {
    pub fn new(bus: Arc<dyn MessageBus>, topic: impl Into<String>, origin: InstanceId) -> Self {
        Self {
            bus,
            topic: topic.into(),
            origin,
        }
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, BusError> {
        let envelope = BusEnvelope {
            origin: self.origin.as_uuid(),
            message: MessageRecord::from(message),
        };
        serde_json::to_vec(&envelope).map_err(|e| BusError::Encode(e.to_string()))
    }
}

#[async_trait]
impl MessagePublisher for BusPublisher {
    async fn publish(&self, message: &Message) -> Result<(), BusError> {
        let record = self.encode(message)?;
        self.bus.publish(&self.topic, record).await?;
        tracing::debug!(message = %message.id, topic = %self.topic, "Published message to bus");
        Ok(())
    }
}

/// 受信側アダプター
pub struct BusSubscriber {
    bus: Arc<dyn MessageBus>,
    topic: String,
    origin: InstanceId,
    hub: Hub,
    resubscribe_delay: Duration,
}

impl BusSubscriber {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        topic: impl Into<String>,
        origin: InstanceId,
        hub: Hub,
    ) -> Self {
        Self {
            bus,
            topic: topic.into(),
            origin,
            hub,
            resubscribe_delay: DEFAULT_RESUBSCRIBE_DELAY,
        }
    }

    pub fn with_resubscribe_delay(mut self, delay: Duration) -> Self {
        self.resubscribe_delay = delay;
        self
    }

    /// レコードを1件デコードしてハブに渡す。
    ///
    /// 自インスタンスが発行したレコードはスキップする。
    pub async fn handle_record(&self, record: &[u8]) -> Result<InboundOutcome, BusBridgeError> {
        let envelope: BusEnvelope = serde_json::from_slice(record)?;
        if envelope.origin == self.origin.as_uuid() {
            return Ok(InboundOutcome::SkippedOwnOrigin);
        }

        let message = Message::try_from(envelope.message)?;
        let id = message.id;
        self.hub.broadcast(message).await?;
        Ok(InboundOutcome::Broadcast(id))
    }

    /// 購読してから、バックグラウンドタスクでトピックを消費する。
    ///
    /// 戻った時点で購読は有効なので、以降に発行されたレコードは取りこぼさない。
    /// 購読が終わるたびに再購読し、ハブのイベントループがなくなったら停止する。
    pub async fn start(self) -> JoinHandle<()> {
        let subscription = self.subscribe().await;
        tokio::spawn(self.run(subscription))
    }

    async fn run(self, mut subscription: Option<Box<dyn BusSubscription>>) {
        loop {
            if let Some(mut active) = subscription.take() {
                if self.consume(active.as_mut()).await.is_break() {
                    tracing::info!(topic = %self.topic, "Hub stopped, bus subscriber exiting");
                    return;
                }
                tracing::warn!(topic = %self.topic, "Bus subscription ended");
            }
            tokio::time::sleep(self.resubscribe_delay).await;
            subscription = self.subscribe().await;
        }
    }

    async fn subscribe(&self) -> Option<Box<dyn BusSubscription>> {
        match self.bus.subscribe(&self.topic).await {
            Ok(subscription) => {
                tracing::info!(topic = %self.topic, origin = %self.origin, "Subscribed to bus topic");
                Some(subscription)
            }
            Err(e) => {
                tracing::warn!(topic = %self.topic, "Failed to subscribe to bus: {}", e);
                None
            }
        }
    }

    async fn consume(&self, subscription: &mut dyn BusSubscription) -> ControlFlow<()> {
        while let Some(record) = subscription.next_record().await {
            match self.handle_record(&record).await {
                Ok(InboundOutcome::Broadcast(id)) => {
                    tracing::debug!(message = %id, "Forwarded bus message to hub");
                }
                Ok(InboundOutcome::SkippedOwnOrigin) => {}
                Err(BusBridgeError::Hub(_)) => return ControlFlow::Break(()),
                Err(e) => {
                    tracing::warn!(topic = %self.topic, "Discarding bus record: {}", e);
                }
            }
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageContent, RoomId, Timestamp, UserId, bus::MockMessageBus},
        hub::{HubConfig, OutboundReceiver},
        infrastructure::bus::InMemoryBus,
    };

    fn message(content: &str) -> Message {
        Message {
            id: MessageId::new(1).unwrap(),
            room: RoomId::new(5).unwrap(),
            user: UserId::new(1).unwrap(),
            content: MessageContent::new(content.to_string()).unwrap(),
            created_at: Timestamp::new(1000),
        }
    }

    async fn hub_with_listener() -> (Hub, OutboundReceiver) {
        let (hub, _event_loop) = Hub::spawn(HubConfig::default());
        let (connection, rx) =
            hub.open_connection(UserId::new(2).unwrap(), RoomId::new(5).unwrap());
        hub.register(connection).await.unwrap();
        (hub, rx)
    }

    async fn recv(rx: &mut OutboundReceiver) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for outbound payload")
    }

    #[tokio::test]
    async fn test_record_from_other_instance_is_broadcast() {
        // テスト項目: 他インスタンス発のレコードはデコードされてブロードキャストされる
        // given (前提条件):
        let (hub, mut rx) = hub_with_listener().await;
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let publisher = BusPublisher::new(bus.clone(), DEFAULT_TOPIC, InstanceId::generate());
        let record = publisher.encode(&message("hi")).unwrap();
        let subscriber = BusSubscriber::new(bus, DEFAULT_TOPIC, InstanceId::generate(), hub);

        // when (操作):
        let outcome = subscriber.handle_record(&record).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome, InboundOutcome::Broadcast(MessageId::new(1).unwrap()));
        assert_eq!(recv(&mut rx).await, Some("hi".to_string()));
    }

    #[tokio::test]
    async fn test_undecodable_record_is_not_broadcast() {
        // テスト項目: デコードできないレコードはブロードキャストされず破棄される
        // given (前提条件):
        let (hub, mut rx) = hub_with_listener().await;
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let subscriber = BusSubscriber::new(bus, DEFAULT_TOPIC, InstanceId::generate(), hub.clone());

        // when (操作):
        let malformed = subscriber.handle_record(b"{not json").await;
        let zero_valued = subscriber
            .handle_record(
                br#"{"origin":"00000000-0000-0000-0000-000000000000","message":{"id":0,"room":5,"user":0,"content":"","created_at":0}}"#,
            )
            .await;
        hub.flush().await.unwrap();

        // then (期待する結果):
        assert!(matches!(malformed, Err(BusBridgeError::Malformed(_))));
        assert!(matches!(zero_valued, Err(BusBridgeError::Invalid(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_own_records_are_skipped() {
        // テスト項目: 自インスタンスが publish したレコードは二重配送されない
        // given (前提条件):
        let (hub, mut rx) = hub_with_listener().await;
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let origin = InstanceId::generate();
        let publisher = BusPublisher::new(bus.clone(), DEFAULT_TOPIC, origin);
        let record = publisher.encode(&message("echo")).unwrap();
        let subscriber = BusSubscriber::new(bus, DEFAULT_TOPIC, origin, hub.clone());

        // when (操作):
        let outcome = subscriber.handle_record(&record).await.unwrap();
        hub.flush().await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome, InboundOutcome::SkippedOwnOrigin);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_started_subscriber_forwards_published_messages() {
        // テスト項目: 起動済みのサブスクライバは publish されたメッセージをハブに流す
        // given (前提条件):
        let (hub, mut rx) = hub_with_listener().await;
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let task = BusSubscriber::new(bus.clone(), DEFAULT_TOPIC, InstanceId::generate(), hub)
            .start()
            .await;
        let publisher = BusPublisher::new(bus.clone(), DEFAULT_TOPIC, InstanceId::generate());

        // when (操作):
        bus.publish(DEFAULT_TOPIC, b"garbage".to_vec()).await.unwrap();
        publisher.publish(&message("from elsewhere")).await.unwrap();

        // then (期待する結果): 不正なレコードは飛ばされ、正しいものだけが届く
        assert_eq!(recv(&mut rx).await, Some("from elsewhere".to_string()));
        task.abort();
    }

    #[tokio::test]
    async fn test_subscriber_resubscribes_after_subscription_ends() {
        // テスト項目: 購読が切れた後に再購読して受信を続ける
        // given (前提条件):
        let (hub, mut rx) = hub_with_listener().await;
        let memory_bus = Arc::new(InMemoryBus::default());
        let bus: Arc<dyn MessageBus> = memory_bus.clone();
        let task = BusSubscriber::new(bus.clone(), DEFAULT_TOPIC, InstanceId::generate(), hub)
            .with_resubscribe_delay(Duration::from_millis(10))
            .start()
            .await;
        let publisher = BusPublisher::new(bus, DEFAULT_TOPIC, InstanceId::generate());

        // when (操作):
        memory_bus.close_topic(DEFAULT_TOPIC).await;
        let mut received = None;
        for _ in 0..100 {
            publisher.publish(&message("after reconnect")).await.unwrap();
            if let Ok(Some(payload)) =
                tokio::time::timeout(Duration::from_millis(20), rx.recv()).await
            {
                received = Some(payload);
                break;
            }
        }

        // then (期待する結果):
        assert_eq!(received, Some("after reconnect".to_string()));
        task.abort();
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported() {
        // テスト項目: バスへの publish 失敗は呼び出し元に返される
        // given (前提条件):
        let mut bus = MockMessageBus::new();
        bus.expect_publish().times(1).returning(|topic, _| {
            Err(BusError::Publish {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            })
        });
        let publisher = BusPublisher::new(Arc::new(bus), DEFAULT_TOPIC, InstanceId::generate());

        // when (操作):
        let result = publisher.publish(&message("hi")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(BusError::Publish {
                topic: DEFAULT_TOPIC.to_string(),
                reason: "broker unavailable".to_string(),
            })
        );
    }
}
