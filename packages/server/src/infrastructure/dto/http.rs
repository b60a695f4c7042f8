//! HTTP API request and response bodies.

use serde::{Deserialize, Serialize};

/// Room metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by: i64,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// Room metadata plus its live state in this instance's hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    #[serde(flatten)]
    pub room: RoomDto,
    /// Whether the room is currently in the hub
    pub live: bool,
    pub connected_clients: usize,
}

/// Users who joined a room, ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMembersDto {
    pub room: i64,
    pub members: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_by: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub room: i64,
    pub user: i64,
    pub content: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub user: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
