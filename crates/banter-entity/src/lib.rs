//! # banter-entity
//!
//! Domain entity models for Banter. Every struct in this crate represents
//! a database table row or a wire-facing record shape. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod channel;
pub mod message;
pub mod reaction;
pub mod user;
