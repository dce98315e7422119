//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle login, token refresh, logout and session revocation,
//! and are nested under `/auth` by `api::app_router`.

use crate::api::AppState;
use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router(state: &AppState) -> Router<AppState> {
    let authenticated = middleware::from_fn_with_state(state.clone(), jwt_auth);
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_auth);

    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout).layer(authenticated.clone()))
        .route("/revoke", post(revoke_session).layer(authenticated.clone()))
        .route("/me", get(me).layer(authenticated))
        .route("/sessions/{id}", get(get_session).layer(admin_only.clone()))
        .route(
            "/sessions/{id}/revoke",
            post(revoke_session_by_id).layer(admin_only),
        )
}
