//! Connection gateway — owns the connection lifecycle.
//!
//! All presence mutations happen here: the event router and other
//! readers observe the registries but never change them. Registering
//! and tearing down a connection drives the `user:online` and
//! `user:offline` presence edges.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use banter_core::config::RealtimeConfig;

use crate::dispatch::Dispatcher;
use crate::event::types::OutboundEvent;
use crate::presence::registry::{PresenceRegistry, RegisterOutcome, UnregisterOutcome};
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;
use crate::store::ChatStore;

use super::authenticator::AuthenticatedUser;
use super::handle::{ConnectionHandle, ConnectionId};

/// Manages WebSocket connection setup and teardown.
pub struct ConnectionGateway {
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomRegistry>,
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn ChatStore>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGateway").finish()
    }
}

impl ConnectionGateway {
    /// Creates a new connection gateway.
    pub fn new(
        config: RealtimeConfig,
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomRegistry>,
        dispatcher: Arc<Dispatcher>,
        store: Arc<dyn ChatStore>,
    ) -> Self {
        Self {
            presence,
            rooms,
            dispatcher,
            store,
            config,
        }
    }

    /// Registers an authenticated connection.
    ///
    /// Joins the connection to its user room and to every channel the
    /// user is a member of, and broadcasts `user:online` to everyone
    /// else when this is the user's first connection. Returns the handle
    /// and the receiver for outbound frames.
    pub async fn connect(
        &self,
        user: AuthenticatedUser,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(
            user.user_id,
            user.username,
            user.is_guest,
            tx,
        ));

        let outcome = self.presence.register(handle.clone());
        if outcome == RegisterOutcome::CameOnline {
            self.dispatcher.broadcast_except_user(
                &handle.user_id,
                &OutboundEvent::UserOnline {
                    user_id: handle.user_id,
                },
            );
        }

        self.enforce_connection_cap(&handle);

        // Personal room for targeted events (mentions).
        self.rooms.join(RoomId::User(handle.user_id), handle.id);

        match self.store.member_channel_ids(handle.user_id).await {
            Ok(channel_ids) => {
                for channel_id in channel_ids {
                    self.rooms.join(RoomId::Channel(channel_id), handle.id);
                }
            }
            Err(e) => {
                // Connection stays up; the user just receives no
                // channel traffic until they reconnect.
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    error = %e,
                    "Failed to load channel memberships"
                );
            }
        }

        if let Err(e) = self.store.touch_last_seen(handle.user_id).await {
            warn!(user_id = %handle.user_id, error = %e, "Failed to update last seen");
        }

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            username = %handle.username,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Tears down a connection.
    ///
    /// Broadcasts `user:offline` when this was the user's last
    /// connection. Safe to call more than once per connection.
    pub async fn disconnect(&self, conn_id: &ConnectionId) {
        let Some((handle, outcome)) = self.presence.unregister(conn_id) else {
            return;
        };

        handle.mark_closed();
        self.rooms.leave_all(*conn_id);

        if outcome == UnregisterOutcome::WentOffline {
            self.dispatcher.broadcast_except_user(
                &handle.user_id,
                &OutboundEvent::UserOffline {
                    user_id: handle.user_id,
                },
            );
        }

        if let Err(e) = self.store.touch_last_seen(handle.user_id).await {
            warn!(user_id = %handle.user_id, error = %e, "Failed to update last seen");
        }

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            "WebSocket connection unregistered"
        );
    }

    /// Closes all connections (graceful shutdown).
    pub fn close_all(&self) {
        let all = self.presence.all_connections();
        for conn in &all {
            conn.mark_closed();
            self.presence.unregister(&conn.id);
            self.rooms.leave_all(conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Evicts the user's oldest connection when they exceed the cap.
    ///
    /// Runs after the new connection is registered, so the eviction can
    /// never produce a spurious offline edge.
    fn enforce_connection_cap(&self, new_handle: &Arc<ConnectionHandle>) {
        let connections = self.presence.connections_for(&new_handle.user_id);
        if connections.len() <= self.config.max_connections_per_user {
            return;
        }

        let oldest = connections
            .iter()
            .filter(|c| c.id != new_handle.id)
            .min_by_key(|c| c.connected_at);
        if let Some(oldest) = oldest {
            warn!(
                user_id = %new_handle.user_id,
                evicted = %oldest.id,
                max = self.config.max_connections_per_user,
                "User over connection cap, evicting oldest connection"
            );
            oldest.mark_closed();
            self.presence.unregister(&oldest.id);
            self.rooms.leave_all(oldest.id);
        }
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.presence.connection_count()
    }

    /// Returns the number of unique online users.
    pub fn user_count(&self) -> usize {
        self.presence.user_count()
    }
}
