//! # banter-core
//!
//! Core crate for the Banter chat backend. Contains configuration schemas,
//! the unified error system, and the shared result alias.
//!
//! This crate has **no** internal dependencies on other Banter crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
