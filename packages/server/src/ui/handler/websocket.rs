//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};

use crate::{
    domain::{RoomId, UserId},
    infrastructure::transport::split_socket,
    lifecycle::run_connection,
    ui::state::AppState,
};

use super::error::ApiError;

/// Validate the room and user, then upgrade to a WebSocket.
///
/// Validation runs before the upgrade so an unknown room is answered with a
/// plain HTTP error and no connection is ever registered for it.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((room_id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let room = RoomId::new(room_id)?;
    let user = UserId::new(user_id)?;

    if let Err(e) = state.connect_participant_usecase.validate(room, user).await {
        tracing::warn!(room = %room, user = %user, "Rejecting connection: {}", e);
        return Err(e.into());
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room, user)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room: RoomId, user: UserId) {
    let (connection, outbound) = match state.connect_participant_usecase.register(room, user).await
    {
        Ok(registered) => registered,
        Err(e) => {
            tracing::error!(room = %room, user = %user, "Failed to register connection: {}", e);
            return;
        }
    };
    tracing::info!(
        connection = %connection.id(),
        user = %user,
        room = %room,
        "Client connected"
    );

    let (writer, reader) = split_socket(socket);
    run_connection(
        state.hub.clone(),
        state.send_message_usecase.clone(),
        connection,
        outbound,
        reader,
        writer,
    )
    .await;
}
