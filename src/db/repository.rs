//! Repository pattern implementation for data access layer
//!
//! `UserRepository` is the credential store consumed by the auth subsystem.
//! `HabitRepository` is the ownership filter: every query and mutation
//! carries the owner's user id, so another user's rows are indistinguishable
//! from missing rows.

use crate::core::error::{Result, TrackerError};
use crate::db::manager::DatabaseManager;
use crate::db::models::{Habit, User};
use rusqlite::{OptionalExtension, Row};
use std::sync::Arc;

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn habit_from_row(row: &Row) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        frequency: row.get(4)?,
        streak: row.get(5)?,
        last_logged: row.get(6)?,
    })
}

/// Repository for User entities (the credential store)
pub struct UserRepository {
    db: Arc<DatabaseManager>,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Find a user by email (case-sensitive, as stored)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
                    [&email],
                    user_from_row,
                )
                .optional()
                .map_err(TrackerError::DatabaseError)
            })
            .await
    }

    /// Find a user by its numeric id (token subject resolution)
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
                    [id],
                    user_from_row,
                )
                .optional()
                .map_err(TrackerError::DatabaseError)
            })
            .await
    }

    /// Insert a new user, returning the stored record
    ///
    /// A duplicate email surfaces as `Conflict`; the UNIQUE constraint makes
    /// this hold even for concurrent registrations that pass the handler's
    /// pre-check.
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        self.db
            .execute(move |conn| {
                let created_at = chrono::Utc::now().to_rfc3339();

                let inserted = conn.execute(
                    "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)",
                    rusqlite::params![&email, &password_hash, &created_at],
                );

                match inserted {
                    Ok(_) => Ok(User {
                        id: conn.last_insert_rowid(),
                        email,
                        password_hash,
                        created_at,
                    }),
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Err(TrackerError::Conflict("Email already registered".to_string()))
                    }
                    Err(e) => Err(TrackerError::DatabaseError(e)),
                }
            })
            .await
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                    .map_err(TrackerError::DatabaseError)
            })
            .await
    }
}

/// Fields for creating a habit
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub category: Option<String>,
    pub frequency: Option<String>,
}

/// Partial update to a habit; None fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub streak: Option<i64>,
    pub last_logged: Option<String>,
}

/// Repository for Habit entities (the ownership filter)
pub struct HabitRepository {
    db: Arc<DatabaseManager>,
}

impl HabitRepository {
    /// Create a new HabitRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Insert a habit owned by the given user
    pub async fn create(&self, user_id: i64, habit: NewHabit) -> Result<Habit> {
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO habits (user_id, name, category, frequency, streak) \
                     VALUES (?, ?, ?, ?, 0)",
                    rusqlite::params![user_id, &habit.name, &habit.category, &habit.frequency],
                )
                .map_err(TrackerError::DatabaseError)?;

                Ok(Habit {
                    id: conn.last_insert_rowid(),
                    user_id,
                    name: habit.name,
                    category: habit.category,
                    frequency: habit.frequency,
                    streak: 0,
                    last_logged: None,
                })
            })
            .await
    }

    /// List all habits owned by the given user
    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<Habit>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, user_id, name, category, frequency, streak, last_logged \
                         FROM habits WHERE user_id = ? ORDER BY id",
                    )
                    .map_err(TrackerError::DatabaseError)?;

                let habits = stmt
                    .query_map([user_id], habit_from_row)
                    .map_err(TrackerError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(TrackerError::DatabaseError)?;

                Ok(habits)
            })
            .await
    }

    /// Find a habit by id, scoped to its owner
    pub async fn find_owned(&self, id: i64, user_id: i64) -> Result<Option<Habit>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT id, user_id, name, category, frequency, streak, last_logged \
                     FROM habits WHERE id = ? AND user_id = ?",
                    [id, user_id],
                    habit_from_row,
                )
                .optional()
                .map_err(TrackerError::DatabaseError)
            })
            .await
    }

    /// Apply a partial update to an owned habit, returning the updated record
    /// or None when the habit does not exist or belongs to someone else
    pub async fn update_owned(
        &self,
        id: i64,
        user_id: i64,
        changes: HabitChanges,
    ) -> Result<Option<Habit>> {
        self.db
            .execute(move |conn| {
                let existing = conn
                    .query_row(
                        "SELECT id, user_id, name, category, frequency, streak, last_logged \
                         FROM habits WHERE id = ? AND user_id = ?",
                        [id, user_id],
                        habit_from_row,
                    )
                    .optional()
                    .map_err(TrackerError::DatabaseError)?;

                let mut habit = match existing {
                    Some(h) => h,
                    None => return Ok(None),
                };

                if let Some(name) = changes.name {
                    habit.name = name;
                }
                if let Some(category) = changes.category {
                    habit.category = Some(category);
                }
                if let Some(frequency) = changes.frequency {
                    habit.frequency = Some(frequency);
                }
                if let Some(streak) = changes.streak {
                    habit.streak = streak;
                }
                if let Some(last_logged) = changes.last_logged {
                    habit.last_logged = Some(last_logged);
                }

                conn.execute(
                    "UPDATE habits SET name = ?, category = ?, frequency = ?, streak = ?, \
                     last_logged = ? WHERE id = ? AND user_id = ?",
                    rusqlite::params![
                        &habit.name,
                        &habit.category,
                        &habit.frequency,
                        habit.streak,
                        &habit.last_logged,
                        id,
                        user_id
                    ],
                )
                .map_err(TrackerError::DatabaseError)?;

                Ok(Some(habit))
            })
            .await
    }

    /// Delete an owned habit; returns false when nothing matched
    pub async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let deleted = conn
                    .execute(
                        "DELETE FROM habits WHERE id = ? AND user_id = ?",
                        [id, user_id],
                    )
                    .map_err(TrackerError::DatabaseError)?;
                Ok(deleted > 0)
            })
            .await
    }
}
