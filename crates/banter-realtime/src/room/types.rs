//! Room identifiers.

use std::fmt;

use uuid::Uuid;

/// A fan-out target for broadcast delivery.
///
/// Channel rooms carry chat traffic for one channel; user rooms carry
/// targeted events to every connection a user has open. The two
/// namespaces never collide even when a channel and a user share a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// All members of a chat channel.
    Channel(Uuid),
    /// All connections belonging to one user.
    User(Uuid),
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Channel(id) => write!(f, "channel:{id}"),
            RoomId::User(id) => write!(f, "user:{id}"),
        }
    }
}
