//! UseCase layer.

mod connect_participant;
mod error;
mod room_admin;
mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use error::{ConnectError, RoomAdminError, SendMessageError};
pub use room_admin::{ROOM_NAME_MAX_CHARS, RoomAdminUseCase, RoomDetail};
pub use send_message::SendMessageUseCase;
