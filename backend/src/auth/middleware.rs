//! Middleware for protecting authenticated routes and handling authorization.
//!
//! This module contains the bearer-token gate placed in front of protected
//! routes, and the [`CurrentUser`] extractor handlers use to read the claims
//! the gate attached to the request.

use crate::api::AppState;
use crate::api::common::service_error_to_http;
use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt::{Claims, JwtUtils};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Extensions, HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

/// Who may pass the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any caller with a valid access token
    Authenticated,
    /// Valid access token with the admin flag set
    AdminOnly,
}

impl AccessPolicy {
    /// Verify the request's bearer token and check it against this policy.
    pub fn authorize(self, jwt_utils: &JwtUtils, headers: &HeaderMap) -> ServiceResult<Claims> {
        let token = bearer_token(headers)?;
        let claims = jwt_utils.validate_token(token)?;

        if self == AccessPolicy::AdminOnly && !claims.is_admin() {
            return Err(ServiceError::permission_denied("admin role required"));
        }

        Ok(claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The header must hold exactly two whitespace-separated fields, the first
/// being literally `Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> ServiceResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(ServiceError::MissingHeader)?
        .to_str()
        .map_err(|_| ServiceError::MalformedHeader)?;

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (None, _, _) => Err(ServiceError::MissingHeader),
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(ServiceError::MalformedHeader),
    }
}

async fn enforce(
    policy: AccessPolicy,
    state: &AppState,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let claims = policy
        .authorize(&state.jwt_utils, request.headers())
        .map_err(|error| {
            let path = request.uri().path();
            match &error {
                ServiceError::PermissionDenied { .. } => {
                    tracing::info!(?policy, %error, path, "Request forbidden");
                }
                error if error.is_unauthorized() => {
                    tracing::warn!(?policy, %error, path, "Request rejected");
                }
                // Server faults are logged by the HTTP mapping.
                _ => {}
            }
            service_error_to_http(error)
        })?;

    // Add claims to request extensions for use in handlers
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// JWT authentication middleware
pub async fn jwt_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    enforce(AccessPolicy::Authenticated, &state, request, next).await
}

/// Admin role authorization middleware
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    enforce(AccessPolicy::AdminOnly, &state, request, next).await
}

/// Read the claims the gate attached to this request.
pub fn claims_from_extensions(extensions: &Extensions) -> ServiceResult<Claims> {
    extensions
        .get::<Claims>()
        .cloned()
        .ok_or(ServiceError::ClaimsMissing)
}

/// Claims of the authenticated caller.
///
/// Rejects with a server error when the route is not behind the gate.
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_from_extensions(&parts.extensions)
            .map(CurrentUser)
            .map_err(service_error_to_http)
    }
}
