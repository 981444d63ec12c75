//! Authentication API handlers

use crate::api::handlers::AppState;
use crate::auth::middleware::AuthUser;
use crate::auth::models::{LoginForm, RegisterRequest, TokenResponse, UserInfo};
use crate::auth::password::{hash_password_with_cost, verify_password};
use crate::core::error::{Result, TrackerError};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Handler for POST /api/v1/users - User registration
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!(email = %req.email, "User registration attempt");

    if !EMAIL_RE.is_match(&req.email) {
        return Err(TrackerError::ValidationError(
            "email is not a valid address".to_string(),
        ));
    }
    if req.password.is_empty() {
        return Err(TrackerError::ValidationError(
            "password must not be empty".to_string(),
        ));
    }

    // Pre-check for a clean conflict message; the UNIQUE constraint in the
    // repository still backstops concurrent registrations.
    if state.user_repo.find_by_email(&req.email).await?.is_some() {
        tracing::warn!(email = %req.email, "Registration rejected, email taken");
        return Err(TrackerError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password_with_cost(&req.password, state.bcrypt_cost)?;

    let user = state.user_repo.create(&req.email, &password_hash).await?;

    tracing::info!(user_id = user.id, email = %user.email, "User registered successfully");

    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }),
    ))
}

/// Handler for POST /api/v1/token - Login
///
/// Accepts form-encoded credentials and responds with a bearer token. Unknown
/// email and wrong password collapse to the same response so callers cannot
/// probe which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>> {
    tracing::info!(email = %form.username, "Login attempt");

    let user = state
        .user_repo
        .find_by_email(&form.username)
        .await?
        .ok_or_else(|| {
            TrackerError::AuthenticationError("Incorrect username or password".to_string())
        })?;

    let is_valid = verify_password(&form.password, &user.password_hash)?;
    if !is_valid {
        tracing::warn!(email = %form.username, "Invalid password");
        return Err(TrackerError::AuthenticationError(
            "Incorrect username or password".to_string(),
        ));
    }

    let token = state.tokens.issue(user.id)?;

    tracing::info!(user_id = user.id, email = %user.email, "Login successful");

    Ok(Json(TokenResponse::bearer(token)))
}

/// Handler for GET /api/v1/me - Current user info
pub async fn get_me(user: AuthUser) -> Json<UserInfo> {
    Json(UserInfo {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
    })
}
