//! Habit request models

use serde::Deserialize;

/// Create habit request
#[derive(Debug, Deserialize)]
pub struct HabitCreate {
    pub name: String,
    pub category: Option<String>,
    pub frequency: Option<String>,
}

/// Partial habit update request; absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub streak: Option<i64>,
    pub last_logged: Option<String>,
}
