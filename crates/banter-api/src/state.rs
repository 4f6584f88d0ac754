//! Application state shared across all handlers.

use std::sync::Arc;

use banter_core::config::AppConfig;
use banter_database::DatabasePool;
use banter_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool
    pub db: DatabasePool,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}
