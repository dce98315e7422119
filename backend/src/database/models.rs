//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user. Read-only from the auth core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
}

/// A persisted refresh-token grant.
///
/// `id` is the `jti` of the refresh token the session was created for.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_email: String,
    pub refresh_token: String,
    pub is_revoked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to persist a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: String,
    pub user_email: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a stored session. A deleted session has no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Revoked,
}

impl Session {
    pub fn state(&self) -> SessionState {
        if self.is_revoked {
            SessionState::Revoked
        } else {
            SessionState::Active
        }
    }
}
