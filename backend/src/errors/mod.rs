//! Global application error types and handlers.
//!
//! This module defines the error types shared by the token codec, the session
//! lifecycle service and the HTTP layer. Conversion to HTTP responses lives in
//! `api::common`.

use thiserror::Error;

/// Errors raised while creating or verifying signed tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be produced (bad duration, signing failure).
    #[error("Token encoding error: {0}")]
    Encoding(String),
    /// Signature did not match, or the token was signed with another algorithm.
    #[error("Invalid token signature")]
    InvalidSignature,
    /// The token is past its expiry.
    #[error("Token has expired")]
    Expired,
    /// The input is not a structurally valid token.
    #[error("Malformed token: {0}")]
    Malformed(String),
    /// The signing secret does not meet the minimum length.
    #[error("Signing secret must be at least {min} bytes")]
    SecretTooShort { min: usize },
}

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Unknown email or wrong password; the two are never distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Session revoked: {session_id}")]
    SessionRevoked { session_id: String },

    #[error("Session does not match token: {session_id}")]
    SessionMismatch { session_id: String },

    #[error("Authorization header is missing")]
    MissingHeader,

    #[error("Authorization header is malformed")]
    MalformedHeader,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// A handler asked for claims on a route the auth gate does not cover.
    #[error("Request claims are missing")]
    ClaimsMissing,

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    pub fn session_revoked(session_id: impl Into<String>) -> Self {
        Self::SessionRevoked {
            session_id: session_id.into(),
        }
    }

    pub fn session_mismatch(session_id: impl Into<String>) -> Self {
        Self::SessionMismatch {
            session_id: session_id.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// True for every failure that should be reported to the client as 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::Token(
                    TokenError::InvalidSignature | TokenError::Expired | TokenError::Malformed(_)
                )
                | Self::SessionNotFound { .. }
                | Self::SessionRevoked { .. }
                | Self::SessionMismatch { .. }
                | Self::MissingHeader
                | Self::MalformedHeader
        )
    }
}
