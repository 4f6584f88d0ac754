//! Reaction entity model and broadcast record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserRef;

/// A persisted emoji reaction (table row).
///
/// The (user_id, message_id, emoji) triple is unique — enforced by a
/// database constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reaction {
    /// Unique reaction identifier.
    pub id: Uuid,
    /// The emoji (as a unicode string).
    pub emoji: String,
    /// Reacting user.
    pub user_id: Uuid,
    /// Message the reaction is attached to.
    pub message_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The reaction record broadcast to channel rooms on add.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRecord {
    /// Reaction ID.
    pub id: Uuid,
    /// The emoji.
    pub emoji: String,
    /// Reacting user projection.
    pub user: UserRef,
}
