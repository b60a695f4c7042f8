//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{MessageContent, RoomId, UserId},
    infrastructure::dto::http::{
        CreateRoomRequest, MessageDto, RoomDetailDto, RoomDto, RoomMembersDto,
        SendMessageRequest, SendMessageResponse,
    },
    ui::state::AppState,
    usecase::SendMessageError,
};

use super::error::ApiError;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RoomDto>>, ApiError> {
    let rooms = state.room_admin_usecase.list_rooms().await?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.iter().map(RoomDto::from).collect()))
}

/// Create a room and open it in the hub
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), ApiError> {
    let created_by = UserId::new(request.created_by)?;
    let room = state
        .room_admin_usecase
        .create_room(request.name, request.description, created_by)
        .await?;
    Ok((StatusCode::CREATED, Json(RoomDto::from(&room))))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let detail = state
        .room_admin_usecase
        .room_detail(RoomId::new(room_id)?)
        .await?;

    Ok(Json(RoomDetailDto {
        room: RoomDto::from(&detail.info),
        live: detail.live.is_some(),
        connected_clients: detail.live.map_or(0, |live| live.connection_count),
    }))
}

/// Delete a room, disconnecting every client in it
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .room_admin_usecase
        .remove_room(RoomId::new(room_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the users who joined a room
pub async fn get_room_members(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomMembersDto>, ApiError> {
    let room = RoomId::new(room_id)?;
    let members = state.room_admin_usecase.room_members(room).await?;
    Ok(Json(RoomMembersDto {
        room: room.value(),
        members: members.iter().map(|user| user.value()).collect(),
    }))
}

/// Get the message history of a room
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let messages = state
        .room_admin_usecase
        .room_messages(RoomId::new(room_id)?)
        .await?;
    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

/// Post a message to a room, as if it had been sent over a WebSocket
pub async fn post_room_message(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    let room = RoomId::new(room_id)?;
    let user = UserId::new(request.user)?;
    let content = MessageContent::new(request.content)?;

    // 存在しないルームへの投稿は 404
    state.room_admin_usecase.room_detail(room).await?;

    let message = match state.send_message_usecase.execute(room, user, content).await {
        Ok(message) => message,
        // 保存とローカル配送は完了しているので成功として扱う
        Err(SendMessageError::Publish { message, source }) => {
            tracing::warn!(message = %message.id, "Bus publish failed: {}", source);
            *message
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            id: message.id.value(),
        }),
    ))
}
