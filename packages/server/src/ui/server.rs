//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_room, delete_room, get_room_detail, get_room_members, get_room_messages, get_rooms,
        health_check, post_room_message, websocket_handler,
    },
    state::AppState,
};

/// Chat server
///
/// Owns the shared [`AppState`] and turns it into an axum router.
///
/// # Example
///
/// ```ignore
/// let listener = TcpListener::bind("127.0.0.1:8080").await?;
/// Server::new(state).serve(listener, shutdown_signal()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/rooms/{room_id}/users/{user_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms).post(create_room))
            .route(
                "/api/rooms/{room_id}",
                get(get_room_detail).delete(delete_room),
            )
            .route("/api/rooms/{room_id}/members", get(get_room_members))
            .route(
                "/api/rooms/{room_id}/messages",
                get(get_room_messages).post(post_room_message),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!("Chat server listening on {}", local_addr);
        tracing::info!(
            "Connect to: ws://{}/ws/rooms/{{room_id}}/users/{{user_id}}",
            local_addr
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
