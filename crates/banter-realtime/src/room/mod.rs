//! Broadcast rooms (channel and per-user).

pub mod registry;
pub mod types;

pub use registry::RoomRegistry;
pub use types::RoomId;
