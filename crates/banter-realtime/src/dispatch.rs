//! Event fan-out over the presence and room registries.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::event::types::OutboundEvent;
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;

/// Delivers outbound events to connections.
///
/// Each method serializes the event once and pushes the frame to every
/// target connection. Delivery is best-effort; dead or saturated
/// connections drop frames without failing the caller.
#[derive(Debug)]
pub struct Dispatcher {
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over shared registries.
    pub fn new(presence: Arc<PresenceRegistry>, rooms: Arc<RoomRegistry>) -> Self {
        Self { presence, rooms }
    }

    /// Sends an event to a single connection.
    pub fn send_to_connection(&self, handle: &ConnectionHandle, event: &OutboundEvent) {
        if let Some(frame) = self.serialize(event) {
            handle.send(frame);
        }
    }

    /// Sends an event to every connection in a user's personal room.
    ///
    /// An offline user has no room, so the event is dropped rather
    /// than queued.
    pub fn send_to_user(&self, user_id: &Uuid, event: &OutboundEvent) -> usize {
        self.broadcast_room_inner(&RoomId::User(*user_id), None, event)
    }

    /// Broadcasts an event to every member of a room.
    pub fn broadcast_to_room(&self, room: &RoomId, event: &OutboundEvent) -> usize {
        self.broadcast_room_inner(room, None, event)
    }

    /// Broadcasts an event to every member of a room except one connection.
    pub fn broadcast_to_room_except(
        &self,
        room: &RoomId,
        exclude: &ConnectionId,
        event: &OutboundEvent,
    ) -> usize {
        self.broadcast_room_inner(room, Some(*exclude), event)
    }

    /// Broadcasts an event to every connection not owned by the given user.
    pub fn broadcast_except_user(&self, user_id: &Uuid, event: &OutboundEvent) -> usize {
        let Some(frame) = self.serialize(event) else {
            return 0;
        };
        let mut sent = 0;
        for conn in self.presence.all_connections() {
            if conn.user_id == *user_id {
                continue;
            }
            if conn.send(frame.clone()) {
                sent += 1;
            }
        }
        sent
    }

    fn broadcast_room_inner(
        &self,
        room: &RoomId,
        exclude: Option<ConnectionId>,
        event: &OutboundEvent,
    ) -> usize {
        let Some(frame) = self.serialize(event) else {
            return 0;
        };
        let mut sent = 0;
        for conn_id in self.rooms.members(room) {
            if exclude == Some(conn_id) {
                continue;
            }
            if let Some(handle) = self.presence.get(&conn_id) {
                if handle.send(frame.clone()) {
                    sent += 1;
                }
            }
        }
        sent
    }

    fn serialize(&self, event: &OutboundEvent) -> Option<String> {
        match event.to_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound event");
                None
            }
        }
    }
}
