//! Transport adapters.

pub mod websocket;

pub use websocket::{WebSocketReceiver, WebSocketSender, split_socket};
