//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse incoming HTTP requests for login, token refresh,
//! logout and session revocation, and delegate to `auth::service`.

use crate::api::AppState;
use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::middleware::CurrentUser;
use crate::auth::models::*;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
};

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<LoginResponse>, (StatusCode, String)> {
    match state.auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<RefreshTokenResponse>, (StatusCode, String)> {
    match state.auth_service.refresh_token(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request: deletes the caller's refresh session
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .auth_service
        .logout(claims.session_id())
        .await
        .map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Revoke the caller's own refresh session
#[axum::debug_handler]
pub async fn revoke_session(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .auth_service
        .revoke(claims.session_id())
        .await
        .map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get current user information from token
pub async fn me(CurrentUser(claims): CurrentUser) -> ResponseJson<MeResponse> {
    ResponseJson(MeResponse {
        id: claims.user_id(),
        session_id: claims.session_id().to_string(),
        expires_at: claims.expires_at(),
        email: claims.email,
        is_admin: claims.is_admin,
    })
}

/// Inspect any session (admin only)
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<SessionInfo>>, (StatusCode, String)> {
    match state.auth_service.find_session(&id).await {
        Ok(Some(session)) => Ok(ResponseJson(ApiResponse::success(
            SessionInfo::from(session),
            "Session retrieved successfully",
        ))),
        Ok(None) => {
            let error_response =
                ApiResponse::<()>::error("Session not found", "session_not_found");
            Err((
                StatusCode::NOT_FOUND,
                serde_json::to_string(&error_response).unwrap_or_default(),
            ))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Revoke any session by id (admin only)
#[axum::debug_handler]
pub async fn revoke_session_by_id(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    tracing::info!(admin_id = admin.user_id(), session_id = %id, "Admin revoking session");

    state
        .auth_service
        .revoke(&id)
        .await
        .map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}
