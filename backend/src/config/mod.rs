//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, the token signing secret and token lifetimes.

use anyhow::{Context, Result, bail};
use std::env;

/// Minimum accepted length, in bytes, of the token signing secret.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound, in seconds, on any token lifetime (one year).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = lookup("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET not set")?;
        validate_secret(&jwt_secret)?;

        let access_token_ttl_seconds = lookup("ACCESS_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|| "900".to_string())
            .parse::<i64>()
            .context("ACCESS_TOKEN_TTL_SECONDS must be a valid number")?;

        let refresh_token_ttl_seconds = lookup("REFRESH_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|| "86400".to_string())
            .parse::<i64>()
            .context("REFRESH_TOKEN_TTL_SECONDS must be a valid number")?;

        validate_ttl("ACCESS_TOKEN_TTL_SECONDS", access_token_ttl_seconds)?;
        validate_ttl("REFRESH_TOKEN_TTL_SECONDS", refresh_token_ttl_seconds)?;

        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            server_port,
        })
    }
}

/// Rejects signing secrets shorter than [`MIN_SECRET_LENGTH`] bytes.
pub fn validate_secret(secret: &str) -> Result<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        bail!(
            "JWT_SECRET must be at least {} bytes long",
            MIN_SECRET_LENGTH
        );
    }
    Ok(())
}

/// Rejects token lifetimes outside `1..=MAX_TOKEN_TTL_SECONDS`.
fn validate_ttl(name: &str, seconds: i64) -> Result<()> {
    if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&seconds) {
        bail!(
            "{} must be between 1 and {} seconds, got {}",
            name,
            MAX_TOKEN_TTL_SECONDS,
            seconds
        );
    }
    Ok(())
}
