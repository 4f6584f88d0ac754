//! Channel entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A chat channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Channel {
    /// Unique channel identifier.
    pub id: Uuid,
    /// Unique channel name (e.g. "general").
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the channel is invite-only.
    pub is_private: bool,
    /// When the channel was created.
    pub created_at: DateTime<Utc>,
}
