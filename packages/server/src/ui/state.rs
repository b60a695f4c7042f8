//! Shared application state.

use std::sync::Arc;

use crate::{
    hub::Hub,
    usecase::{ConnectParticipantUseCase, RoomAdminUseCase, SendMessageUseCase},
};

/// State shared by every handler
pub struct AppState {
    /// Hub（接続中のクライアントとルームのレジストリ）
    pub hub: Hub,
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// RoomAdminUseCase（ルーム管理のユースケース）
    pub room_admin_usecase: Arc<RoomAdminUseCase>,
}
