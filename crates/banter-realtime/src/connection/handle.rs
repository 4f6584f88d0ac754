//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, mpsc};
use uuid::Uuid;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the outbound frame channel plus metadata
/// about the authenticated user. The socket task owns the receiver half
/// and forwards frames onto the wire.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: Uuid,
    /// Username (cached for typing/mention payloads)
    pub username: String,
    /// Whether the token carried the guest flag
    pub is_guest: bool,
    /// Sender for serialized outbound frames
    pub sender: mpsc::Sender<String>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive
    pub alive: AtomicBool,
    /// Wakes the socket task when the engine closes the connection
    close_signal: Notify,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: Uuid, username: String, is_guest: bool, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            username,
            is_guest,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
            close_signal: Notify::new(),
        }
    }

    /// Send a serialized frame to this connection.
    ///
    /// Delivery is best-effort: a full buffer drops the frame, a closed
    /// receiver marks the connection dead. Returns whether the frame was
    /// accepted for delivery.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(_) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed and wake anyone waiting on the close signal
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.close_signal.notify_one();
    }

    /// Resolves once the connection has been marked closed.
    ///
    /// The socket task awaits this so an eviction or shutdown tears the
    /// transport down even when the client never sends another frame.
    pub async fn wait_closed(&self) {
        while self.is_alive() {
            self.close_signal.notified().await;
        }
    }
}
