//! Domain layer.
//!
//! Value objects, entities and the collaborator interfaces (persistence, bus,
//! transport) the hub and the use cases depend on. Concrete implementations live
//! in the infrastructure layer.

pub mod bus;
pub mod entity;
pub mod error;
pub mod repository;
pub mod transport;
pub mod value_object;

pub use bus::{BusSubscription, MessageBus, MessagePublisher};
pub use entity::{Message, NewRoom, RoomInfo};
pub use error::{BusError, RepositoryError, TransportError, ValueObjectError};
pub use repository::{MessageRepository, RoomRepository};
pub use transport::{CloseSignal, TransportReceiver, TransportSender};
pub use value_object::{
    ConnectionId, InstanceId, MESSAGE_CONTENT_MAX_CHARS, MessageContent, MessageId, RoomId,
    Timestamp, UserId,
};
