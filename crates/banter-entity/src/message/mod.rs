//! Message domain entities.

pub mod model;

pub use model::{Message, MessageRecord};
