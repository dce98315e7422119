//! Core business logic for the authentication system.
//!
//! `AuthService` owns the relationship between tokens and refresh sessions:
//! login mints an access/refresh pair and persists a session keyed by the
//! refresh token's `jti`; refresh exchanges a live, unrevoked refresh token
//! for a new access token; logout deletes the session and revoke flags it.
//! Sessions are never cached here; every call goes to the store.

use crate::auth::models::*;
use crate::database::models::{CreateSession, Session};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::{SessionStore, UserStore};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::{verify_dummy_password, verify_password};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

/// Authentication service for handling login, token refresh and session management
pub struct AuthService {
    jwt_utils: Arc<JwtUtils>,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(
        jwt_utils: Arc<JwtUtils>,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        AuthService {
            jwt_utils,
            sessions,
            users,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    /// Token codec shared with the request gate
    pub fn jwt_utils(&self) -> &Arc<JwtUtils> {
        &self.jwt_utils
    }

    /// Authenticate user, mint an access/refresh pair and open a session
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        login_request.validate().map_err(validation_error)?;

        let Some(user) = self.users.get_user_by_email(&login_request.email).await? else {
            verify_dummy_password(login_request.password).await?;
            warn!("Login failed: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(login_request.password, user.password_hash.clone()).await? {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let (refresh_token, refresh_claims) = self.jwt_utils.generate_token(
            user.id,
            &user.email,
            user.is_admin,
            self.refresh_token_ttl,
        )?;

        let (access_token, access_claims) = self.jwt_utils.generate_session_token(
            user.id,
            &user.email,
            user.is_admin,
            &refresh_claims.jti,
            self.access_token_ttl,
        )?;

        let session = self
            .sessions
            .create_session(CreateSession {
                id: refresh_claims.jti.clone(),
                user_email: user.email.clone(),
                refresh_token: refresh_token.clone(),
                expires_at: refresh_claims.expires_at(),
                created_at: self.jwt_utils.now(),
            })
            .await?;

        info!(user_id = user.id, session_id = %session.id, "User logged in");

        Ok(LoginResponse {
            session_id: session.id,
            access_token,
            refresh_token,
            access_token_expires_at: access_claims.expires_at(),
            refresh_token_expires_at: refresh_claims.expires_at(),
            user: UserInfo::from(&user),
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated and stays usable until it
    /// expires or its session is revoked or deleted.
    pub async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> ServiceResult<RefreshTokenResponse> {
        request.validate().map_err(validation_error)?;

        let claims = self.jwt_utils.validate_token(&request.refresh_token)?;

        let session = self
            .sessions
            .get_session(&claims.jti)
            .await?
            .ok_or_else(|| ServiceError::session_not_found(&claims.jti))?;

        if session.is_revoked {
            warn!(session_id = %session.id, "Refresh attempted on revoked session");
            return Err(ServiceError::session_revoked(session.id));
        }

        if session.user_email != claims.email || session.refresh_token != request.refresh_token {
            warn!(session_id = %session.id, "Refresh token does not match its session");
            return Err(ServiceError::session_mismatch(session.id));
        }

        let (access_token, access_claims) = self.jwt_utils.generate_session_token(
            claims.user_id(),
            &claims.email,
            claims.is_admin,
            &session.id,
            self.access_token_ttl,
        )?;

        debug!(session_id = %session.id, "Access token refreshed");

        Ok(RefreshTokenResponse {
            access_token,
            access_token_expires_at: access_claims.expires_at(),
        })
    }

    /// Delete a session. Deleting a session that no longer exists succeeds.
    pub async fn logout(&self, session_id: &str) -> ServiceResult<()> {
        if self.sessions.delete_session(session_id).await? {
            info!(session_id, "Session logged out");
        } else {
            debug!(session_id, "Logout for session that no longer exists");
        }
        Ok(())
    }

    /// Mark a session revoked while keeping its record.
    ///
    /// Revoking an already revoked session succeeds; an unknown session is
    /// reported as `SessionNotFound`.
    pub async fn revoke(&self, session_id: &str) -> ServiceResult<()> {
        if !self.sessions.revoke_session(session_id).await? {
            return Err(ServiceError::session_not_found(session_id));
        }
        info!(session_id, "Session revoked");
        Ok(())
    }

    /// Look up a session for inspection
    pub async fn find_session(&self, session_id: &str) -> ServiceResult<Option<Session>> {
        Ok(self.sessions.get_session(session_id).await?)
    }
}

fn validation_error(validation_errors: ValidationErrors) -> ServiceError {
    let error_messages: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect();
    ServiceError::validation(error_messages.join(", "))
}
