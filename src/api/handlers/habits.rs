//! Habit CRUD handlers
//!
//! Every operation is scoped to the authenticated user's identity. A habit
//! that exists but belongs to another user answers 404, same as a habit that
//! does not exist, so callers cannot probe for other users' rows.

use crate::api::handlers::AppState;
use crate::api::models::{HabitCreate, HabitUpdate};
use crate::auth::middleware::AuthUser;
use crate::core::error::{Result, TrackerError};
use crate::db::models::Habit;
use crate::db::repository::{HabitChanges, NewHabit};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Handler for POST /api/v1/habits - Create a habit
pub async fn create_habit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<HabitCreate>,
) -> Result<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(TrackerError::ValidationError(
            "name must not be empty".to_string(),
        ));
    }

    let habit = state
        .habit_repo
        .create(
            user.id,
            NewHabit {
                name: req.name,
                category: req.category,
                frequency: req.frequency,
            },
        )
        .await?;

    tracing::info!(user_id = user.id, habit_id = habit.id, "Habit created");

    Ok((StatusCode::CREATED, Json(habit)))
}

/// Handler for GET /api/v1/habits - List the caller's habits
pub async fn list_habits(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Habit>>> {
    let habits = state.habit_repo.find_by_user(user.id).await?;
    Ok(Json(habits))
}

/// Handler for GET /api/v1/habits/:id - Get one habit
pub async fn get_habit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(habit_id): Path<i64>,
) -> Result<Json<Habit>> {
    let habit = state
        .habit_repo
        .find_owned(habit_id, user.id)
        .await?
        .ok_or_else(|| TrackerError::NotFound("Habit not found".to_string()))?;

    Ok(Json(habit))
}

/// Handler for PUT /api/v1/habits/:id - Update a habit
pub async fn update_habit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(habit_id): Path<i64>,
    Json(req): Json<HabitUpdate>,
) -> Result<Json<Habit>> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(TrackerError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
    }

    let habit = state
        .habit_repo
        .update_owned(
            habit_id,
            user.id,
            HabitChanges {
                name: req.name,
                category: req.category,
                frequency: req.frequency,
                streak: req.streak,
                last_logged: req.last_logged,
            },
        )
        .await?
        .ok_or_else(|| TrackerError::NotFound("Habit not found".to_string()))?;

    tracing::info!(user_id = user.id, habit_id, "Habit updated");

    Ok(Json(habit))
}

/// Handler for DELETE /api/v1/habits/:id - Delete a habit
pub async fn delete_habit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(habit_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let deleted = state.habit_repo.delete_owned(habit_id, user.id).await?;
    if !deleted {
        return Err(TrackerError::NotFound("Habit not found".to_string()));
    }

    tracing::info!(user_id = user.id, habit_id, "Habit deleted");

    Ok(StatusCode::NO_CONTENT)
}
