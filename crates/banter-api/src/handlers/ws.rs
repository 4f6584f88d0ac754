//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use banter_core::error::AppError;
use banter_realtime::AuthenticatedUser;
use banter_realtime::connection::heartbeat::run_keepalive;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt} — WebSocket upgrade
///
/// The token is checked before the protocol upgrade, so a bad token is
/// rejected with a plain 401 and no socket is ever opened.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .ok_or_else(|| AppError::authentication("Authentication token required"))?;

    let handshake_timeout = Duration::from_secs(state.realtime.config().handshake_timeout_seconds);
    let auth = tokio::time::timeout(
        handshake_timeout,
        state.realtime.authenticator.authenticate(&token),
    )
    .await
    .map_err(|_| AppError::service_unavailable("Authentication timed out"))??;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, auth, socket)))
}

/// Drives an established WebSocket connection until it closes.
async fn handle_ws_connection(state: AppState, auth: AuthenticatedUser, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.realtime.gateway.connect(auth).await;
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        "WebSocket connection established"
    );

    // Forward engine frames onto the wire.
    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Application-level keepalive pings.
    let keepalive_task = tokio::spawn(run_keepalive(
        handle.clone(),
        Duration::from_secs(state.realtime.config().ping_interval_seconds),
        state.realtime.shutdown_receiver(),
    ));

    let mut shutdown_rx = state.realtime.shutdown_receiver();
    loop {
        tokio::select! {
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        state.realtime.router.handle_frame(&handle, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Protocol pings are answered by axum automatically.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            // Eviction or engine shutdown marks the handle closed; tear
            // the transport down even if the client stays silent.
            _ = handle.wait_closed() => break,
            _ = shutdown_rx.recv() => break,
        }
    }

    outbound_task.abort();
    keepalive_task.abort();
    state.realtime.gateway.disconnect(&conn_id).await;

    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        "WebSocket connection closed"
    );
}
