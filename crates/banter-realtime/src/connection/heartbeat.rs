//! Periodic keepalive pings for WebSocket connections.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time;
use tracing::debug;

use crate::event::types::OutboundEvent;

use super::handle::ConnectionHandle;

/// Runs the keepalive loop for one connection.
///
/// Sends an application-level ping every `interval` until the
/// connection dies or shutdown is signalled. A failed send marks the
/// connection dead so the socket task tears it down.
pub async fn run_keepalive(
    handle: Arc<ConnectionHandle>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(interval);
    // The first tick fires immediately; skip it so pings start one
    // interval after connect.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !handle.is_alive() {
                    break;
                }
                let ping = OutboundEvent::Ping {
                    timestamp: Utc::now().timestamp_millis(),
                };
                let Ok(frame) = ping.to_frame() else { break };
                if !handle.send(frame) && !handle.is_alive() {
                    break;
                }
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }

    debug!(conn_id = %handle.id, "Keepalive loop ended");
}
