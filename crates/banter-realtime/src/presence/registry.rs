//! Presence registry — tracks which users are online and through which connections.
//!
//! A user is online while at least one connection is registered for them.
//! Register and unregister report edge transitions so the gateway can
//! broadcast `user:online` and `user:offline` exactly once per edge, no
//! matter how many tabs or devices the user has open.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::connection::handle::{ConnectionHandle, ConnectionId};

/// Outcome of registering a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// First connection for this user; they just came online.
    CameOnline,
    /// The user already had at least one other connection.
    AlreadyOnline,
}

/// Outcome of unregistering a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// That was the user's last connection; they are now offline.
    WentOffline,
    /// The user still has other connections open.
    StillOnline,
}

/// Thread-safe registry of all active WebSocket connections, indexed by user.
#[derive(Debug)]
pub struct PresenceRegistry {
    /// User ID → connection handles (one user can have multiple connections).
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl PresenceRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
            by_id: DashMap::new(),
        }
    }

    /// Registers a connection, reporting whether its user just came online.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> RegisterOutcome {
        self.by_id.insert(handle.id, handle.clone());
        let mut connections = self.by_user.entry(handle.user_id).or_default();
        let outcome = if connections.is_empty() {
            RegisterOutcome::CameOnline
        } else {
            RegisterOutcome::AlreadyOnline
        };
        connections.push(handle);
        outcome
    }

    /// Unregisters a connection, reporting whether its user went offline.
    ///
    /// Returns `None` when the connection is unknown (already removed by a
    /// concurrent teardown), in which case no presence state changed.
    pub fn unregister(
        &self,
        conn_id: &ConnectionId,
    ) -> Option<(Arc<ConnectionHandle>, UnregisterOutcome)> {
        let (_, handle) = self.by_id.remove(conn_id)?;

        let mut outcome = UnregisterOutcome::WentOffline;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove(&handle.user_id);
            } else {
                outcome = UnregisterOutcome::StillOnline;
            }
        }

        Some((handle, outcome))
    }

    /// Checks if a user has at least one registered connection.
    pub fn is_online(&self, user_id: &Uuid) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Gets all connections for a user.
    pub fn connections_for(&self, user_id: &Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns all online user IDs.
    pub fn online_user_ids(&self) -> Vec<Uuid> {
        self.by_user.iter().map(|entry| *entry.key()).collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique online users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
