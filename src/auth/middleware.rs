//! Authentication middleware
//!
//! The auth gate for every protected endpoint: extracts the bearer token,
//! verifies it, and resolves the subject claim against the credential store.
//! Every failure collapses to one generic 401 so callers learn nothing about
//! which step rejected them; the precise reason is logged server-side only.

use crate::api::handlers::AppState;
use crate::auth::jwt::AuthFailure;
use crate::core::error::{Result, TrackerError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The identity resolved by the auth gate, stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

fn credentials_rejected() -> TrackerError {
    TrackerError::AuthenticationError("Could not validate credentials".to_string())
}

/// Authentication middleware
///
/// Pipeline per request: header parse -> signature check -> expiry check ->
/// subject resolution. Any failure short-circuits to the uniform rejection.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => {
            tracing::warn!("Missing bearer token on protected route");
            return credentials_rejected().into_response();
        }
    };

    // Structure, signature and expiry
    let claims = match state.tokens.verify(token) {
        Ok(c) => c,
        Err(failure) => {
            tracing::warn!(reason = %failure, "Token verification failed");
            return credentials_rejected().into_response();
        }
    };

    // Subject resolution: the user may have been deleted since issuance
    let user_id = match claims.user_id() {
        Some(id) => id,
        None => {
            tracing::warn!(reason = %AuthFailure::UnknownSubject, sub = %claims.sub, "Subject claim is not a user id");
            return credentials_rejected().into_response();
        }
    };

    let user = match state.user_repo.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            tracing::warn!(reason = %AuthFailure::UnknownSubject, user_id, "Token subject no longer exists");
            return credentials_rejected().into_response();
        }
        Err(e) => return e.into_response(), // Database error
    };

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
    });

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = TrackerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(credentials_rejected)
    }
}
