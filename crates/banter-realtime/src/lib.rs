//! # banter-realtime
//!
//! Real-time WebSocket engine for Banter. Provides:
//!
//! - WebSocket connection management with JWT handshake authentication
//! - User presence tracking with online/offline edge broadcasts
//! - Channel and per-user rooms for targeted fan-out
//! - Message, typing, and reaction event routing with
//!   persist-then-broadcast ordering
//! - Keepalive pings and graceful shutdown

pub mod connection;
pub mod dispatch;
pub mod event;
pub mod presence;
pub mod room;
pub mod server;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use connection::authenticator::{AuthenticatedUser, WsAuthenticator};
pub use connection::gateway::ConnectionGateway;
pub use event::router::EventRouter;
pub use presence::registry::PresenceRegistry;
pub use room::types::RoomId;
pub use server::RealtimeEngine;
pub use store::{ChatStore, PostgresChatStore};
