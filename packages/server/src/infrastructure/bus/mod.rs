//! メッセージバス
//!
//! ## 責務
//!
//! - インメモリ実装 [`InMemoryBus`] を提供する
//! - ハブとバスをつなぐブリッジ（[`BusPublisher`] / [`BusSubscriber`]）を提供する

mod bridge;
mod inmemory;

pub use bridge::{
    BusBridgeError, BusPublisher, BusSubscriber, DEFAULT_RESUBSCRIBE_DELAY, DEFAULT_TOPIC,
    InboundOutcome,
};
pub use inmemory::{DEFAULT_BUS_CAPACITY, InMemoryBus};
