//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use banter_core::config::RealtimeConfig;
use banter_core::error::AppError;

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::gateway::ConnectionGateway;
use crate::dispatch::Dispatcher;
use crate::event::router::EventRouter;
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;
use crate::store::ChatStore;

use banter_auth::JwtDecoder;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Presence registry (read-only outside the gateway).
    pub presence: Arc<PresenceRegistry>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    /// Connection gateway.
    pub gateway: Arc<ConnectionGateway>,
    /// Inbound event router.
    pub router: Arc<EventRouter>,
    /// Handshake authenticator.
    pub authenticator: Arc<WsAuthenticator>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, decoder: Arc<JwtDecoder>, store: Arc<dyn ChatStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let presence = Arc::new(PresenceRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(presence.clone(), rooms.clone()));
        let gateway = Arc::new(ConnectionGateway::new(
            config.clone(),
            presence.clone(),
            rooms.clone(),
            dispatcher.clone(),
            store.clone(),
        ));
        let router = Arc::new(EventRouter::new(
            config.clone(),
            dispatcher,
            store.clone(),
        ));
        let authenticator = Arc::new(WsAuthenticator::new(decoder, store));

        info!("Real-time engine initialized");

        Self {
            presence,
            rooms,
            gateway,
            router,
            authenticator,
            config,
            shutdown_tx,
        }
    }

    /// Returns the realtime configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        // Signal keepalive and socket tasks to stop
        let _ = self.shutdown_tx.send(());

        // Close all connections
        self.gateway.close_all();

        info!("Real-time engine shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::authenticator::AuthenticatedUser;
    use crate::testutil::MockChatStore;
    use banter_core::config::AuthConfig;

    fn engine() -> (RealtimeEngine, Arc<MockChatStore>) {
        let store = Arc::new(MockChatStore::new());
        let decoder = Arc::new(JwtDecoder::new(&AuthConfig::default()));
        (
            RealtimeEngine::new(RealtimeConfig::default(), decoder, store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn shutdown_closes_all_connections() {
        let (engine, store) = engine();
        let user = store.add_user("alice");
        let (handle, _rx) = engine
            .gateway
            .connect(AuthenticatedUser {
                user_id: user.id,
                username: user.username,
                is_guest: false,
            })
            .await;

        let mut shutdown_rx = engine.shutdown_receiver();
        engine.shutdown().await.unwrap();

        assert!(!handle.is_alive());
        assert_eq!(engine.presence.connection_count(), 0);
        assert!(shutdown_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn authenticator_rejects_unknown_user_without_state_change() {
        let (engine, _store) = engine();
        let encoder = banter_auth::JwtEncoder::new(&AuthConfig::default());
        let token = encoder
            .generate_token(uuid::Uuid::new_v4(), false)
            .unwrap();

        let err = engine.authenticator.authenticate(&token).await.unwrap_err();
        assert_eq!(err.message, "User not found");
        assert_eq!(engine.presence.connection_count(), 0);
        assert_eq!(engine.rooms.room_count(), 0);
    }

    #[tokio::test]
    async fn authenticator_rejects_garbage_token() {
        let (engine, _store) = engine();
        let err = engine
            .authenticator
            .authenticate("not-a-token")
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid authentication token");
    }

    #[tokio::test]
    async fn authenticator_accepts_token_for_existing_user() {
        let (engine, store) = engine();
        let user = store.add_user("alice");
        let encoder = banter_auth::JwtEncoder::new(&AuthConfig::default());
        let token = encoder.generate_token(user.id, false).unwrap();

        let authed = engine.authenticator.authenticate(&token).await.unwrap();
        assert_eq!(authed.user_id, user.id);
        assert_eq!(authed.username, "alice");
        assert!(!authed.is_guest);
    }
}
