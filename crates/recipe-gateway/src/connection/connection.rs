//! Individual WebSocket connection
//!
//! Represents a single authenticated connection: the user it belongs to and
//! the channel feeding its write task.

use crate::protocol::Envelope;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Frame queued for a connection's write task
#[derive(Debug, Clone)]
pub enum Outbound {
    /// JSON envelope
    Envelope(Envelope),
    /// Heartbeat reply
    Pong,
    /// Close the socket
    Close,
}

/// A single authenticated WebSocket connection
pub struct Connection {
    /// Unique connection id, distinguishes reconnects of the same user
    id: String,

    /// Authenticated user
    user_id: i64,

    /// Channel to the connection's write task
    sender: mpsc::Sender<Outbound>,
}

impl Connection {
    /// Create a new connection for an authenticated user
    pub fn new(user_id: i64, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            sender,
        })
    }

    /// Get the connection id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the user id
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Queue a frame without blocking.
    ///
    /// Returns `false` if the write task is gone or its queue is full;
    /// callers treat that as the connection being unreachable.
    pub fn send(&self, frame: Outbound) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    connection_id = %self.id,
                    user_id = self.user_id,
                    error = %e,
                    "Failed to queue outbound frame"
                );
                false
            }
        }
    }

    /// Queue an envelope for delivery
    pub fn send_envelope(&self, envelope: Envelope) -> bool {
        self.send(Outbound::Envelope(envelope))
    }

    /// Ask the write task to close the socket (best effort)
    pub fn close(&self) -> bool {
        self.send(Outbound::Close)
    }

    /// Check if the write task has terminated
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .finish()
    }
}
