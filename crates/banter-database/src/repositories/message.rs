//! Message repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use banter_core::error::{AppError, ErrorKind};
use banter_core::result::AppResult;
use banter_entity::message::{Message, MessageRecord};
use banter_entity::user::UserRef;

/// Repository for message creation and lookup.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a message with its resolved mentions and return the full
    /// broadcast record (sender and mention projections included).
    ///
    /// The message row and its mention links are written in one
    /// transaction so a partially-linked message is never visible.
    pub async fn create(
        &self,
        sender_id: Uuid,
        channel_id: Uuid,
        content: &str,
        mention_ids: &[Uuid],
    ) -> AppResult<MessageRecord> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (content, channel_id, sender_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(content)
        .bind(channel_id)
        .bind(sender_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))?;

        for user_id in mention_ids {
            sqlx::query(
                "INSERT INTO message_mentions (message_id, user_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(message.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to link mention", e)
            })?;
        }

        let sender = sqlx::query_as::<_, UserRef>(
            "SELECT id, username FROM users WHERE id = $1",
        )
        .bind(sender_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load sender", e))?;

        let mentions = if mention_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, UserRef>(
                "SELECT id, username FROM users WHERE id = ANY($1)",
            )
            .bind(mention_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load mentions", e)
            })?
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit message", e)
        })?;

        Ok(MessageRecord {
            id: message.id,
            content: message.content,
            channel_id: message.channel_id,
            created_at: message.created_at,
            sender,
            mentions,
        })
    }

    /// Resolve the channel a message belongs to.
    pub async fn channel_of(&self, message_id: Uuid) -> AppResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT channel_id FROM messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to resolve message channel", e)
            })
    }
}
