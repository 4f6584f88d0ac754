//! Reaction repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use banter_core::error::{AppError, ErrorKind};
use banter_core::result::AppResult;
use banter_entity::reaction::Reaction;

/// Repository for reaction create/find/delete operations.
#[derive(Debug, Clone)]
pub struct ReactionRepository {
    pool: PgPool,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a reaction.
    ///
    /// The (user_id, message_id, emoji) triple is unique; a duplicate add
    /// maps to `ErrorKind::Conflict` so callers can treat it as benign.
    pub async fn create(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Reaction> {
        sqlx::query_as::<_, Reaction>(
            "INSERT INTO reactions (emoji, user_id, message_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(emoji)
        .bind(user_id)
        .bind(message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Reaction already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create reaction", e),
        })
    }

    /// Find a reaction by its identifying triple.
    pub async fn find(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Option<Reaction>> {
        sqlx::query_as::<_, Reaction>(
            "SELECT * FROM reactions WHERE user_id = $1 AND message_id = $2 AND emoji = $3",
        )
        .bind(user_id)
        .bind(message_id)
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find reaction", e))
    }

    /// Delete a reaction by primary key. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete reaction", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
