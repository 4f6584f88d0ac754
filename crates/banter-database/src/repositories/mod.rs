//! Repository implementations for all Banter entities.

pub mod channel;
pub mod message;
pub mod reaction;
pub mod user;

pub use channel::ChannelRepository;
pub use message::MessageRepository;
pub use reaction::ReactionRepository;
pub use user::UserRepository;
