//! Application builder — wires the realtime engine, state, and router
//! into a running Axum server.

use std::sync::Arc;

use axum::Router;

use banter_auth::JwtDecoder;
use banter_core::config::AppConfig;
use banter_core::error::AppError;
use banter_database::DatabasePool;
use banter_realtime::{PostgresChatStore, RealtimeEngine};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Banter server until shutdown is signalled.
pub async fn run_server(config: AppConfig, db: DatabasePool) -> Result<(), AppError> {
    tracing::info!("Starting Banter server...");

    let store = Arc::new(PostgresChatStore::new(db.pool().clone()));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        jwt_decoder,
        store,
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        realtime: realtime.clone(),
    };

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Banter server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // Connected clients see a close; in-flight writes finish first.
    realtime.shutdown().await?;
    db.close().await;

    tracing::info!("Banter server stopped");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
