//! Database models
//!
//! Data structures representing database tables

use serde::{Deserialize, Serialize};

/// User record in the database
///
/// `password_hash` is the opaque bcrypt output; the plaintext is never
/// stored. Serialization to API responses goes through `UserInfo`, which
/// omits the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Habit record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub streak: i64,
    pub last_logged: Option<String>,
}
