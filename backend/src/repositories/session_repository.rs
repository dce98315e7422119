//! Database repository for refresh sessions.

use crate::database::models::{CreateSession, Session};
use crate::repositories::SessionStore;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

const SESSION_COLUMNS: &str = "id, user_email, refresh_token, is_revoked, expires_at, created_at";

/// Repository for session database operations.
#[derive(Clone)]
pub struct SessionRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    /// Inserts a new session row.
    ///
    /// # Returns
    /// The stored session, as read back from the database
    async fn create_session(&self, session: CreateSession) -> Result<Session> {
        let query = format!(
            "INSERT INTO sessions (id, user_email, refresh_token, is_revoked, expires_at, created_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING {SESSION_COLUMNS}"
        );

        let session = sqlx::query_as::<_, Session>(&query)
            .bind(&session.id)
            .bind(&session.user_email)
            .bind(&session.refresh_token)
            .bind(session.expires_at)
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(session)
    }

    /// Retrieves a session by its id.
    ///
    /// # Returns
    /// `Some(Session)` if found, `None` otherwise
    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?");

        let session = sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    async fn revoke_session(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET is_revoked = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
