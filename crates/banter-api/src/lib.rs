//! # banter-api
//!
//! HTTP layer for Banter built on Axum.
//!
//! Provides the WebSocket upgrade endpoint, a health check, CORS, and
//! the mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
