//! Message entity model and broadcast record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserRef;

/// A persisted chat message (table row).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Message text content.
    pub content: String,
    /// Channel the message was posted to.
    pub channel_id: Uuid,
    /// Sending user.
    pub sender_id: Uuid,
    /// Creation timestamp — the display ordering key.
    pub created_at: DateTime<Utc>,
}

/// The full message record broadcast to channel rooms.
///
/// Field names are camelCase on the wire to match the web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Message ID.
    pub id: Uuid,
    /// Message text content.
    pub content: String,
    /// Owning channel ID.
    pub channel_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Sender projection.
    pub sender: UserRef,
    /// Users mentioned in the content.
    pub mentions: Vec<UserRef>,
}
