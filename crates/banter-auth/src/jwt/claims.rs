//! JWT claims structure and the normalized identity it resolves to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use banter_core::error::AppError;

/// JWT claims payload as issued by the login service.
///
/// Historically tokens carried the subject under either `userId` or `id`;
/// both shapes are accepted here and normalized into [`Identity`] exactly
/// once. Nothing downstream ever inspects raw claim fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user ID (current token shape).
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Subject user ID (legacy token shape).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Whether the token belongs to a guest account.
    #[serde(rename = "isGuest", default)]
    pub is_guest: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Normalize the claims into an [`Identity`].
    ///
    /// Fails when neither subject field is present.
    pub fn into_identity(self) -> Result<Identity, AppError> {
        let user_id = self
            .user_id
            .or(self.id)
            .ok_or_else(|| AppError::authentication("Invalid token structure"))?;

        Ok(Identity {
            user_id,
            is_guest: self.is_guest,
        })
    }
}

/// The normalized result of token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Verified user ID.
    pub user_id: Uuid,
    /// Whether the user authenticated as a guest.
    pub is_guest: bool,
}
