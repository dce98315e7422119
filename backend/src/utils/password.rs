//! Password verification against stored bcrypt hashes.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{DEFAULT_COST, verify};
use std::sync::LazyLock;

/// Hash checked when no account matches, so unknown emails cost the same
/// bcrypt work as known ones.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("session-gate-dummy-password", DEFAULT_COST).ok());

/// Verify a plain text password against the stored hash.
///
/// Runs on the blocking pool since bcrypt is deliberately slow.
///
/// # Returns
/// `true` if password matches hash, `false` otherwise
///
/// # Errors
/// Returns `ServiceError` if the stored hash cannot be parsed or the
/// blocking task fails
pub async fn verify_password(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify(password, &hash))
        .await
        .map_err(|e| ServiceError::internal_error(format!("Password verification task failed: {}", e)))?
        .map_err(|e| ServiceError::internal_error(format!("Password verification failed: {}", e)))
}

/// Run a password check that always fails, for logins with no matching user.
pub async fn verify_dummy_password(password: String) -> ServiceResult<()> {
    tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify(password, hash);
        }
    })
    .await
    .map_err(|e| ServiceError::internal_error(format!("Password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_password() {
        let hash = bcrypt::hash("correct horse", 4).unwrap();

        assert!(verify_password("correct horse".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("battery staple".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_an_error() {
        let result = verify_password("anything".to_string(), "not-a-hash".to_string()).await;
        assert!(matches!(result, Err(ServiceError::InternalError { .. })));
    }

    #[tokio::test]
    async fn test_dummy_hash_is_real_bcrypt_work() {
        let hash = DUMMY_HASH.clone().unwrap();
        assert!(hash.starts_with("$2b$12$"));
        assert!(!verify_password("password123".to_string(), hash).await.unwrap());
        assert!(verify_dummy_password("password123".to_string()).await.is_ok());
    }
}
