//! Request handlers.

mod error;
mod http;
mod websocket;

pub use http::{
    create_room, delete_room, get_room_detail, get_room_members, get_room_messages, get_rooms,
    health_check, post_room_message,
};
pub use websocket::websocket_handler;
