//! Wire DTOs for the HTTP surface.

pub mod response;
