//! WebSocket を使ったトランスポート実装
//!
//! axum の `WebSocket` を送信側と受信側に分割し、ドメイン層の
//! `TransportSender` / `TransportReceiver` として提供します。

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{TransportError, TransportReceiver, TransportSender};

/// Split an upgraded socket into its sending and receiving halves
pub fn split_socket(socket: WebSocket) -> (WebSocketSender, WebSocketReceiver) {
    let (sink, stream) = socket.split();
    (WebSocketSender { sink }, WebSocketReceiver { stream })
}

pub struct WebSocketReceiver {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl TransportReceiver for WebSocketReceiver {
    async fn receive(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => {
                        tracing::warn!(len = bytes.len(), "Dropping non UTF-8 binary frame");
                    }
                },
                // Ping/pong is handled automatically by the WebSocket protocol
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => return None,
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            }
        }
        None
    }
}

pub struct WebSocketSender {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl TransportSender for WebSocketSender {
    async fn send(&mut self, payload: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn send_close(&mut self) -> Result<(), TransportError> {
        self.sink
            .send(Message::Close(None))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
