//! Authentication module for managing sessions and access control.
//!
//! This module provides login, token refresh, logout and revocation, and the
//! authorization middleware placed in front of protected routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
