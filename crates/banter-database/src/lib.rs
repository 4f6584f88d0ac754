//! # banter-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all Banter entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use sqlx::PgPool;
