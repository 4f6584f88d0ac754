//! Wire events and inbound event routing.

pub mod mentions;
pub mod router;
pub mod types;

pub use router::EventRouter;
pub use types::{InboundEvent, OutboundEvent, ReactionKind};
