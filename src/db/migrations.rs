//! Database migrations
//!
//! Versioned schema migrations tracked in a `schema_migrations` table.

use crate::core::error::{Result, TrackerError};
use rusqlite::Connection;
use tracing::info;

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema migration (version 1)
///
/// `users.id` is the canonical subject identifier carried in token claims;
/// the UNIQUE constraint on email enforces one account per address at the
/// storage level.
const MIGRATION_V1: &str = r#"
-- Users table (credential store)
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Habits table; every row is owned by exactly one user
CREATE TABLE IF NOT EXISTS habits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    category TEXT,
    frequency TEXT,
    streak INTEGER NOT NULL DEFAULT 0,
    last_logged TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id);
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
"#;

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    info!("Running database migrations");

    // Create migration tracking table
    conn.execute_batch(MIGRATION_TABLE)
        .map_err(TrackerError::DatabaseError)?;

    // Check current version
    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(TrackerError::DatabaseError)?;

    info!("Current database schema version: {}", current_version);

    if current_version < 1 {
        info!("Applying migration v1: Initial schema");
        apply_migration(conn, 1, MIGRATION_V1)?;
    }

    info!("Database migrations completed");

    Ok(())
}

/// Apply a single migration atomically and record its version
fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let tx = conn.transaction().map_err(TrackerError::DatabaseError)?;

    tx.execute_batch(sql).map_err(TrackerError::DatabaseError)?;

    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [version],
    )
    .map_err(TrackerError::DatabaseError)?;

    tx.commit().map_err(TrackerError::DatabaseError)?;

    Ok(())
}
