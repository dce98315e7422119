//! Storage contracts consumed by the session lifecycle service, and their
//! SQLite implementations.
//!
//! The service only sees the [`SessionStore`] and [`UserStore`] traits. Store
//! failures surface as `anyhow::Error`; an absent row is `Ok(None)` (or
//! `Ok(false)` for mutations), never an error.

use crate::database::models::{CreateSession, Session, User};
use anyhow::Result;
use async_trait::async_trait;

pub mod session_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

/// Persistence of refresh sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new, non-revoked session.
    async fn create_session(&self, session: CreateSession) -> Result<Session>;

    /// Fetches a session by id.
    async fn get_session(&self, id: &str) -> Result<Option<Session>>;

    /// Marks a session revoked. Returns `false` when no such session exists.
    async fn revoke_session(&self, id: &str) -> Result<bool>;

    /// Removes a session. Returns `false` when no such session exists.
    async fn delete_session(&self, id: &str) -> Result<bool>;
}

/// Read access to user credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
}
