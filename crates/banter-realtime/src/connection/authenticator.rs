//! WebSocket authentication — validates the JWT presented at handshake.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use banter_auth::JwtDecoder;
use banter_core::AppError;

use crate::store::ChatStore;

/// Identity attached to an accepted connection.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub user_id: Uuid,
    /// Username, loaded from the user record.
    pub username: String,
    /// Guest flag carried by the token.
    pub is_guest: bool,
}

/// Authenticates WebSocket handshakes using JWT tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// User lookup.
    store: Arc<dyn ChatStore>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>, store: Arc<dyn ChatStore>) -> Self {
        Self { decoder, store }
    }

    /// Authenticates a handshake token.
    ///
    /// The token must verify against the signing secret and its subject
    /// must exist in the user table; a token for a deleted user is
    /// rejected the same way an expired one is.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let identity = self.decoder.verify(token).map_err(|e| {
            debug!(error = %e, "Handshake token rejected");
            AppError::authentication("Invalid authentication token")
        })?;

        let user = self
            .store
            .find_user(identity.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            is_guest: identity.is_guest,
        })
    }
}
