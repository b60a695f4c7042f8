//! Persistence collaborator implementations.

pub mod inmemory;

pub use inmemory::{InMemoryMessageRepository, InMemoryRoomRepository};
