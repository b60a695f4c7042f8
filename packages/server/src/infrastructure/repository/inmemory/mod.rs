//! In-memory repositories.
//!
//! Stand-ins for the relational store of a production deployment. Ids are
//! assigned from per-repository sequences starting at 1.

mod message;
mod room;

pub use message::InMemoryMessageRepository;
pub use room::InMemoryRoomRepository;
