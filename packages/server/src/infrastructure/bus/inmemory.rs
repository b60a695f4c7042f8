//! インメモリの pub/sub バス
//!
//! ## 責務
//!
//! - トピックごとの発行と購読を提供する
//! - 購読者のいないトピックへの発行は破棄する
//!
//! ## 設計ノート
//!
//! 各トピックは `tokio::sync::broadcast` チャネルです。1つの `InMemoryBus` を
//! 共有する複数のハブは、同じ外部バスにつながった複数のバックエンド
//! インスタンスとして振る舞います。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};

use crate::domain::{BusError, BusSubscription, MessageBus};

/// トピックが購読者ごとに保持するレコード数の既定値
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct InMemoryBus {
    /// トピック → broadcast の送り手
    topics: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
    /// トピックチャネルのバッファサイズ
    capacity: usize,
}

impl InMemoryBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// トピックを破棄し、有効な購読をすべて終わらせる。
    ///
    /// 購読者からはブローカー切断と同じくストリームの終了に見える。
    pub async fn close_topic(&self, topic: &str) -> bool {
        self.topics.lock().await.remove(topic).is_some()
    }

    async fn topic(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, record: Vec<u8>) -> Result<(), BusError> {
        let sender = self.topic(topic).await;
        if sender.send(record).is_err() {
            tracing::trace!(topic, "No subscribers, bus record dropped");
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn BusSubscription>, BusError> {
        let receiver = self.topic(topic).await.subscribe();
        Ok(Box::new(InMemorySubscription {
            topic: topic.to_string(),
            receiver,
        }))
    }
}

struct InMemorySubscription {
    topic: String,
    receiver: broadcast::Receiver<Vec<u8>>,
}

#[async_trait]
impl BusSubscription for InMemorySubscription {
    async fn next_record(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.receiver.recv().await {
                Ok(record) => return Some(record),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "Bus subscriber lagged, records skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn next(subscription: &mut Box<dyn BusSubscription>) -> Option<Vec<u8>> {
        tokio::time::timeout(Duration::from_secs(1), subscription.next_record())
            .await
            .expect("timed out waiting for bus record")
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber_of_topic() {
        // テスト項目: トピックの全購読者にレコードが届き、他トピックには届かない
        // given (前提条件):
        let bus = InMemoryBus::default();
        let mut first = bus.subscribe("messages").await.unwrap();
        let mut second = bus.subscribe("messages").await.unwrap();
        let mut other = bus.subscribe("other").await.unwrap();

        // when (操作):
        bus.publish("messages", b"hello".to_vec()).await.unwrap();

        // then (期待する結果):
        assert_eq!(next(&mut first).await, Some(b"hello".to_vec()));
        assert_eq!(next(&mut second).await, Some(b"hello".to_vec()));
        assert!(
            tokio::time::timeout(Duration::from_millis(50), other.next_record())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        // テスト項目: 購読者がいなくても publish はエラーにならない
        // given (前提条件):
        let bus = InMemoryBus::default();

        // when (操作):
        let result = bus.publish("messages", b"dropped".to_vec()).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_to_newest_records() {
        // テスト項目: 遅れた購読者は古いレコードを読み飛ばして続行する
        // given (前提条件):
        let bus = InMemoryBus::new(2);
        let mut subscription = bus.subscribe("messages").await.unwrap();

        // when (操作):
        for i in 0..4_u8 {
            bus.publish("messages", vec![i]).await.unwrap();
        }

        // then (期待する結果):
        assert_eq!(next(&mut subscription).await, Some(vec![2]));
        assert_eq!(next(&mut subscription).await, Some(vec![3]));
    }

    #[tokio::test]
    async fn test_close_topic_ends_subscriptions() {
        // テスト項目: トピックを閉じると購読が終了する
        // given (前提条件):
        let bus = InMemoryBus::default();
        let mut subscription = bus.subscribe("messages").await.unwrap();

        // when (操作):
        let closed = bus.close_topic("messages").await;

        // then (期待する結果):
        assert!(closed);
        assert_eq!(next(&mut subscription).await, None);
    }
}
