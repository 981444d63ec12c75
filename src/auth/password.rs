//! Password hashing and verification using bcrypt
//!
//! bcrypt embeds a per-call random salt and its cost factor in the output
//! string, and its verification compares in constant time.

use crate::core::error::{Result, TrackerError};

/// Lowest cost factor bcrypt accepts. Used by config validation and to keep
/// the adaptive hash fast in tests.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost factor bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Hash a password using bcrypt with an explicit cost factor
///
/// The cost comes from `security.bcrypt_cost`; config validation keeps it
/// within [`MIN_BCRYPT_COST`]..=[`MAX_BCRYPT_COST`].
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| TrackerError::AuthenticationError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash
///
/// A malformed hash yields an error result, never a panic.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| TrackerError::AuthenticationError(format!("Failed to verify password: {}", e)))
}
