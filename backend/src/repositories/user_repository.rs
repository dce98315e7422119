//! Database repository for user credential lookups.

use crate::database::models::User;
use crate::repositories::UserStore;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// Retrieves a user by their email.
    ///
    /// # Arguments
    /// * `email` - Email to search for
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    #[tokio::test]
    async fn test_get_user_by_email() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO users (name, email, password_hash, is_admin) VALUES (?, ?, ?, ?)")
            .bind("Alice")
            .bind("alice@example.com")
            .bind("$2b$04$hash")
            .bind(true)
            .execute(&pool)
            .await
            .unwrap();

        let repo = UserRepository::new(pool);
        let user = repo
            .get_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.name, "Alice");
        assert!(user.is_admin);
        assert!(user.id > 0);
        assert!(
            repo.get_user_by_email("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
