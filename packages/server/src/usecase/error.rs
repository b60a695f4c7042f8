//! UseCase error types.

use thiserror::Error;

use crate::{
    domain::{BusError, Message, RepositoryError, RoomId},
    hub::HubError,
};

/// Errors while admitting a connection into a room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    HubUnavailable(#[from] HubError),
}

impl From<RepositoryError> for ConnectError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(id) => Self::RoomNotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// Errors while creating and distributing a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// The message could not be stored; nothing was broadcast
    #[error("failed to store message: {0}")]
    Persistence(#[source] RepositoryError),

    #[error(transparent)]
    HubUnavailable(#[from] HubError),

    /// The message was stored and broadcast locally, but not published to the bus
    #[error("message {} stored and broadcast locally, bus publish failed: {source}", .message.id)]
    Publish {
        message: Box<Message>,
        source: BusError,
    },
}

/// Errors of room administration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomAdminError {
    #[error("invalid room name: {0}")]
    InvalidName(&'static str),

    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for RoomAdminError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(id) => Self::RoomNotFound(id),
            other => Self::Repository(other),
        }
    }
}
