//! Reaction domain entities.

pub mod model;

pub use model::{Reaction, ReactionRecord};
