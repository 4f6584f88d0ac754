//! Room registry — maps rooms to member connections with a reverse index.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::types::RoomId;

/// Registry of all active rooms and their member connections.
///
/// Membership is tracked per connection, so a user with several
/// connections appears in a room once per connection. Rooms exist only
/// while they have members; the last leave removes the room entry.
#[derive(Debug)]
pub struct RoomRegistry {
    /// Room → member connection IDs.
    rooms: DashMap<RoomId, HashSet<ConnectionId>>,
    /// Connection → rooms it has joined (reverse index for teardown).
    memberships: DashMap<ConnectionId, HashSet<RoomId>>,
}

impl RoomRegistry {
    /// Creates a new empty room registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Adds a connection to a room. Joining twice is a no-op.
    pub fn join(&self, room: RoomId, conn_id: ConnectionId) {
        self.rooms.entry(room).or_default().insert(conn_id);
        self.memberships.entry(conn_id).or_default().insert(room);
    }

    /// Removes a connection from a room.
    pub fn leave(&self, room: RoomId, conn_id: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(&room) {
            members.remove(&conn_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove(&room);
            }
        }
        if let Some(mut joined) = self.memberships.get_mut(&conn_id) {
            joined.remove(&room);
            if joined.is_empty() {
                drop(joined);
                self.memberships.remove(&conn_id);
            }
        }
    }

    /// Removes a connection from every room it joined.
    ///
    /// Returns the rooms it was removed from.
    pub fn leave_all(&self, conn_id: ConnectionId) -> Vec<RoomId> {
        let joined: Vec<RoomId> = self
            .memberships
            .remove(&conn_id)
            .map(|(_, rooms)| rooms.into_iter().collect())
            .unwrap_or_default();

        for room in &joined {
            if let Some(mut members) = self.rooms.get_mut(room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    drop(members);
                    self.rooms.remove(room);
                }
            }
        }

        joined
    }

    /// Returns the member connection IDs of a room.
    pub fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the rooms a connection has joined.
    pub fn rooms_for(&self, conn_id: &ConnectionId) -> Vec<RoomId> {
        self.memberships
            .get(conn_id)
            .map(|joined| joined.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
