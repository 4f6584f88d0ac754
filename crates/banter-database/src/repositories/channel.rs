//! Channel repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use banter_core::error::{AppError, ErrorKind};
use banter_core::result::AppResult;
use banter_entity::channel::Channel;

/// Repository for channel lookup and membership queries.
#[derive(Debug, Clone)]
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    /// Create a new channel repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a channel by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Channel>> {
        sqlx::query_as::<_, Channel>("SELECT * FROM channels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find channel", e))
    }

    /// Find a channel by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Channel>> {
        sqlx::query_as::<_, Channel>("SELECT * FROM channels WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find channel by name", e)
            })
    }

    /// List the IDs of all channels the user is a member of.
    pub async fn member_channel_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT channel_id FROM channel_members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list channel memberships", e)
        })
    }

    /// Check whether a user is a member of a channel.
    pub async fn is_member(&self, channel_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM channel_members WHERE channel_id = $1 AND user_id = $2",
        )
        .bind(channel_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check membership", e)
        })?;
        Ok(count > 0)
    }
}
