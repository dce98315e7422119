//! Main entry point for the session gate backend.
//!
//! This file initializes logging, loads configuration, opens the database,
//! wires the session lifecycle service to its stores and serves the router.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod utils;

use crate::api::{AppState, app_router};
use crate::auth::service::AuthService;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::JwtUtils;
use anyhow::{Context, Result};
use chrono::Duration;
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    let jwt_utils = Arc::new(JwtUtils::new(&config.jwt_secret)?);

    let access_token_ttl = Duration::try_seconds(config.access_token_ttl_seconds)
        .context("ACCESS_TOKEN_TTL_SECONDS out of range")?;
    let refresh_token_ttl = Duration::try_seconds(config.refresh_token_ttl_seconds)
        .context("REFRESH_TOKEN_TTL_SECONDS out of range")?;

    let auth_service = AuthService::new(
        jwt_utils,
        Arc::new(SessionRepository::new(db.pool().clone())),
        Arc::new(UserRepository::new(db.pool().clone())),
        access_token_ttl,
        refresh_token_ttl,
    );

    let app = app_router(AppState::new(auth_service));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting session gate server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
