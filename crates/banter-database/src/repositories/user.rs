//! User repository implementation.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use banter_core::error::{AppError, ErrorKind};
use banter_core::result::AppResult;
use banter_entity::user::{User, UserRef};

/// Repository for user lookup and presence-adjacent updates.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Resolve a batch of usernames to user projections.
    ///
    /// Usernames with no matching user are simply absent from the result.
    pub async fn find_refs_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<UserRef>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, UserRef>(
            "SELECT id, username FROM users WHERE username = ANY($1)",
        )
        .bind(usernames)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve usernames", e)
        })
    }

    /// Update the user's last-seen timestamp to now.
    pub async fn touch_last_seen(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_seen = $1, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last seen", e)
            })?;
        Ok(())
    }
}
