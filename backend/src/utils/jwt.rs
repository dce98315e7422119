//! JWT token utilities for authentication and authorization.
//!
//! Provides secure token creation, validation, and claims management for
//! access and refresh tokens. Tokens are HS256-signed with a process-wide
//! secret; expiry is checked against an injectable [`Clock`].

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::MIN_SECRET_LENGTH;
use crate::errors::TokenError;
use crate::utils::clock::{Clock, SystemClock};

/// JWT Claims structure carried by both access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID, encoded as a string on the wire
    #[serde(with = "subject")]
    pub sub: i64,
    /// User email
    pub email: String,
    /// Whether the user holds the admin role
    pub is_admin: bool,
    /// Unique token ID
    pub jti: String,
    /// Refresh session this access token was issued under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Token issued at, whole seconds since the epoch on the wire
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,
    /// Token expiration, whole seconds since the epoch on the wire
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

mod subject {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtUtils {
    /// Create a new JwtUtils instance backed by the system clock
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a new JwtUtils instance reading time from `clock`
    pub fn with_clock(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::SecretTooShort {
                min: MIN_SECRET_LENGTH,
            });
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is checked against `clock` in `validate_token`, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            clock,
        })
    }

    /// Current time as seen by this codec
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Generate a signed token for the given identity, valid for `duration`
    pub fn generate_token(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
        duration: Duration,
    ) -> Result<(String, Claims), TokenError> {
        self.encode_claims(user_id, email, is_admin, None, duration)
    }

    /// Generate a signed token bound to the refresh session `session_id`
    pub fn generate_session_token(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
        session_id: &str,
        duration: Duration,
    ) -> Result<(String, Claims), TokenError> {
        self.encode_claims(
            user_id,
            email,
            is_admin,
            Some(session_id.to_string()),
            duration,
        )
    }

    fn encode_claims(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
        sid: Option<String>,
        duration: Duration,
    ) -> Result<(String, Claims), TokenError> {
        let seconds = duration.num_seconds();
        if seconds <= 0 {
            return Err(TokenError::Encoding(
                "token duration must be at least one second".to_string(),
            ));
        }

        let iat = self.clock.now().trunc_subsecs(0);
        let exp = Duration::try_seconds(seconds)
            .and_then(|lifetime| iat.checked_add_signed(lifetime))
            .ok_or_else(|| {
                TokenError::Encoding(format!("token duration of {}s is out of range", seconds))
            })?;

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            is_admin,
            jti: Uuid::now_v7().to_string(),
            sid,
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(format!("Token generation failed: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(map_decode_error)?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(error.to_string()),
    }
}

impl Claims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    /// Refresh session this token belongs to.
    ///
    /// Access tokens name their session in `sid`; a refresh token is the
    /// session itself, so its `jti` is returned.
    pub fn session_id(&self) -> &str {
        self.sid.as_deref().unwrap_or(&self.jti)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }

    /// Check if token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp.timestamp()
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::MockClock;
    use std::collections::HashSet;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const OTHER_SECRET: &str = "fedcba9876543210fedcba9876543210";

    fn codec_at_fixed_time() -> (JwtUtils, Arc<MockClock>) {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = Arc::new(MockClock::new(start));
        let utils = JwtUtils::with_clock(SECRET, clock.clone()).unwrap();
        (utils, clock)
    }

    #[test]
    fn test_generated_token_validates_to_same_claims() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let (token, claims) = utils
            .generate_token(42, "alice@example.com", true, Duration::minutes(15))
            .unwrap();

        let decoded = utils.validate_token(&token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id(), 42);
        assert_eq!(decoded.email, "alice@example.com");
        assert!(decoded.is_admin());
        assert_eq!((decoded.exp - decoded.iat).num_seconds(), 15 * 60);
        assert!(decoded.sid.is_none());
    }

    #[test]
    fn test_token_expires_after_duration() {
        let (utils, clock) = codec_at_fixed_time();
        let (token, _) = utils
            .generate_token(1, "bob@example.com", false, Duration::minutes(15))
            .unwrap();

        assert!(utils.validate_token(&token).is_ok());

        clock.advance(Duration::minutes(16));
        assert_eq!(utils.validate_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_valid_until_exact_expiry() {
        let (utils, clock) = codec_at_fixed_time();
        let (token, _) = utils
            .generate_token(1, "bob@example.com", false, Duration::seconds(60))
            .unwrap();

        clock.advance(Duration::seconds(60));
        assert!(utils.validate_token(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(utils.validate_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let other = JwtUtils::new(OTHER_SECRET).unwrap();
        let (token, _) = other
            .generate_token(7, "mallory@example.com", true, Duration::hours(1))
            .unwrap();

        assert_eq!(
            utils.validate_token(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_spliced_payload_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let (user_token, _) = utils
            .generate_token(7, "user@example.com", false, Duration::hours(1))
            .unwrap();
        let (admin_token, _) = utils
            .generate_token(1, "admin@example.com", true, Duration::hours(1))
            .unwrap();

        let user_parts: Vec<&str> = user_token.split('.').collect();
        let admin_parts: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert_eq!(
            utils.validate_token(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let (_, claims) = utils
            .generate_token(7, "user@example.com", true, Duration::hours(1))
            .unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            utils.validate_token(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let (token, _) = utils
            .generate_token(7, "user@example.com", true, Duration::hours(1))
            .unwrap();
        let payload = token.split('.').nth(1).unwrap();
        // {"alg":"none","typ":"JWT"}
        let forged = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert!(matches!(
            utils.validate_token(&forged),
            Err(TokenError::Malformed(_)) | Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_input_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        for input in ["", "abc", "a.b", "a.b.c", "...", "Bearer x.y.z"] {
            assert!(
                matches!(utils.validate_token(input), Err(TokenError::Malformed(_))),
                "input {:?} should be malformed",
                input
            );
        }
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        for duration in [
            Duration::zero(),
            Duration::seconds(-5),
            Duration::milliseconds(500),
        ] {
            assert!(matches!(
                utils.generate_token(1, "a@example.com", false, duration),
                Err(TokenError::Encoding(_))
            ));
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        assert_eq!(
            JwtUtils::new("short").err(),
            Some(TokenError::SecretTooShort { min: 32 })
        );
    }

    #[test]
    fn test_token_ids_unique() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let ids: HashSet<String> = (0..200)
            .map(|_| {
                utils
                    .generate_token(1, "a@example.com", false, Duration::minutes(1))
                    .unwrap()
                    .1
                    .jti
            })
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_session_id_resolution() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let (_, refresh) = utils
            .generate_token(1, "a@example.com", false, Duration::hours(24))
            .unwrap();
        let (token, access) = utils
            .generate_session_token(1, "a@example.com", false, &refresh.jti, Duration::minutes(15))
            .unwrap();

        assert_eq!(refresh.session_id(), refresh.jti);
        assert_eq!(access.session_id(), refresh.jti);
        assert_ne!(access.jti, refresh.jti);
        assert_eq!(
            utils.validate_token(&token).unwrap().sid.as_deref(),
            Some(refresh.jti.as_str())
        );
    }

    #[test]
    fn test_unrepresentable_duration_rejected() {
        let (utils, _) = codec_at_fixed_time();
        for duration in [Duration::MAX, Duration::seconds(10_000_000_000_000)] {
            assert!(matches!(
                utils.generate_token(1, "a@example.com", false, duration),
                Err(TokenError::Encoding(_))
            ));
        }
    }

    #[test]
    fn test_out_of_range_expiry_claim_rejected() {
        let utils = JwtUtils::new(SECRET).unwrap();
        let claims = serde_json::json!({
            "sub": "1",
            "email": "a@example.com",
            "is_admin": false,
            "jti": "x",
            "iat": 1_700_000_000_i64,
            "exp": i64::MAX,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            utils.validate_token(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_expiry_matches_issue_time_plus_duration() {
        let (utils, _) = codec_at_fixed_time();
        let (_, claims) = utils
            .generate_token(1, "a@example.com", false, Duration::days(365))
            .unwrap();

        assert_eq!(claims.iat.timestamp(), 1_700_000_000);
        assert_eq!(
            claims.expires_at(),
            DateTime::from_timestamp(1_700_000_000 + 365 * 86_400, 0).unwrap()
        );
    }
}
