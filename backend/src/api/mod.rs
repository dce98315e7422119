//! HTTP surface: shared application state and the top-level router.

pub mod common;

use crate::api::common::ApiResponse;
use crate::auth::service::AuthService;
use crate::utils::jwt::JwtUtils;
use axum::{Router, response::Json, routing::get};
use std::sync::Arc;

/// State shared by every request handler.
///
/// Built once at startup. Holds only the immutable token codec and the
/// service that fronts the session and user stores.
#[derive(Clone)]
pub struct AppState {
    pub jwt_utils: Arc<JwtUtils>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth_service: AuthService) -> Self {
        Self {
            jwt_utils: auth_service.jwt_utils().clone(),
            auth_service: Arc::new(auth_service),
        }
    }
}

/// Builds the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", crate::auth::routes::auth_router(&state))
        .with_state(state)
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "session-gate",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the session gate API",
    ))
}
