//! Channel domain entities.

pub mod model;

pub use model::Channel;
