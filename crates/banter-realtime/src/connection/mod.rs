//! WebSocket connection lifecycle: authentication, handles, gateway, keepalive.

pub mod authenticator;
pub mod gateway;
pub mod handle;
pub mod heartbeat;

pub use authenticator::{AuthenticatedUser, WsAuthenticator};
pub use gateway::ConnectionGateway;
pub use handle::{ConnectionHandle, ConnectionId};
