//! Duplex transport interfaces.
//!
//! A transport is split into a receiving half owned by the read task and a
//! sending half owned by the write task. Both halves observe one shared
//! [`CloseSignal`], so whichever task notices termination first closes the
//! transport for both.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use super::error::TransportError;

/// Receiving half of a duplex transport
#[async_trait]
pub trait TransportReceiver: Send {
    /// Wait for the next inbound payload.
    ///
    /// Returns `None` once the peer has closed the stream.
    async fn receive(&mut self) -> Option<Result<String, TransportError>>;
}

/// Sending half of a duplex transport
#[async_trait]
pub trait TransportSender: Send {
    async fn send(&mut self, payload: String) -> Result<(), TransportError>;

    /// Send a close frame to the peer
    async fn send_close(&mut self) -> Result<(), TransportError>;
}

/// Idempotent close latch shared by the halves of one transport
#[derive(Debug, Clone)]
pub struct CloseSignal {
    closed: Arc<watch::Sender<bool>>,
}

impl CloseSignal {
    pub fn new() -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            closed: Arc::new(closed),
        }
    }

    /// Close the transport.
    ///
    /// Returns `true` only for the call that actually closed it; later calls are no-ops.
    pub fn close(&self) -> bool {
        self.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolve once the transport has been closed
    pub async fn closed(&self) {
        let mut receiver = self.closed.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = receiver.wait_for(|closed| *closed).await;
    }
}

impl Default for CloseSignal {
    fn default() -> Self {
        Self::new()
    }
}
