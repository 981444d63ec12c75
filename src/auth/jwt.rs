//! JWT token issuance and verification
//!
//! Tokens are stateless HS256-signed claim sets binding a user identity. The
//! signing algorithm is pinned on both sides so a token signed with any other
//! (or no) algorithm is rejected. There is no revocation list; a token stays
//! valid until its natural expiry.

use crate::core::error::{Result, TrackerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// JWT claims structure
///
/// `sub` is the canonical subject representation: the stable numeric user id
/// rendered as a decimal string.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    /// Parse the subject claim back to a numeric user id
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Why a presented token was rejected
///
/// Kept internal for audit logging; callers only ever see the collapsed
/// "Could not validate credentials" response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Malformed,
    InvalidSignature,
    Expired,
    UnknownSubject,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            AuthFailure::Malformed => "malformed",
            AuthFailure::InvalidSignature => "invalid signature",
            AuthFailure::Expired => "expired",
            AuthFailure::UnknownSubject => "unknown subject",
        };
        f.write_str(reason)
    }
}

/// Token issuer and verifier, constructed once at startup from explicit
/// configuration rather than ambient global state.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and default expiry.
    ///
    /// An empty secret is a configuration error; callers check this at
    /// startup and refuse to serve.
    pub fn new(secret: &str, token_expiry_minutes: u64) -> Result<Self> {
        if secret.is_empty() {
            return Err(TrackerError::ConfigError(
                "jwt_secret must not be empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // No grace period on expiry
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl: Duration::minutes(token_expiry_minutes as i64),
        })
    }

    /// Issue a token for a user with the configured default expiry
    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_with_ttl(user_id, self.default_ttl)
    }

    /// Issue a token for a user with an explicit time-to-live
    pub fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            TrackerError::AuthenticationError("Failed to calculate expiration".to_string())
        })?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TrackerError::AuthenticationError(format!("Failed to generate token: {}", e)))
    }

    /// Verify a token and extract its claims
    ///
    /// Checks structure, signature (pinned algorithm) and expiry, in that
    /// order. Subject resolution against the credential store happens in the
    /// auth middleware, which maps a missing user to
    /// [`AuthFailure::UnknownSubject`].
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, AuthFailure> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::ImmatureSignature => AuthFailure::InvalidSignature,
                _ => AuthFailure::Malformed,
            })
    }
}
