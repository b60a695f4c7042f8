//! Bus record wire format.
//!
//! ```json
//! {"origin":"6f1c…","message":{"id":1,"room":5,"user":1,"content":"hi","created_at":1700000000000}}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message as carried on the bus, tagged with the publishing instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusEnvelope {
    pub origin: Uuid,
    pub message: MessageRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub room: i64,
    pub user: i64,
    pub content: String,
    /// Unix timestamp in milliseconds (UTC)
    pub created_at: i64,
}
