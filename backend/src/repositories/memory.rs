//! In-memory stores used by service and HTTP tests.

use crate::database::models::{CreateSession, Session, User};
use crate::repositories::{SessionStore, UserStore};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    unavailable: AtomicBool,
}

impl MemorySessionStore {
    /// Makes every subsequent call fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("session store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, session: CreateSession) -> Result<Session> {
        self.check_available()?;
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            bail!("duplicate session id {}", session.id);
        }
        let stored = Session {
            id: session.id,
            user_email: session.user_email,
            refresh_token: session.refresh_token,
            is_revoked: false,
            expires_at: session.expires_at,
            created_at: session.created_at,
        };
        sessions.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        self.check_available()?;
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn revoke_session(&self, id: &str) -> Result<bool> {
        self.check_available()?;
        match self.sessions.write().await.get_mut(id) {
            Some(session) => {
                session.is_revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self.sessions.write().await.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Vec<User>,
}

impl MemoryUserStore {
    /// Adds a user whose password is hashed with a low bcrypt cost.
    pub fn with_user(mut self, id: i64, email: &str, password: &str, is_admin: bool) -> Self {
        self.users.push(User {
            id,
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            is_admin,
        });
        self
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }
}
