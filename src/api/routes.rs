//! API routes

use crate::api::handlers::{
    create_habit, delete_habit, get_habit, health_check, list_habits, update_habit, AppState,
};
use crate::auth::handlers::{get_me, login, register};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API routes
///
/// Protected routes sit behind the auth gate; registration, login and the
/// health check are the only public endpoints.
pub fn build_api_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/users", post(register))
        .route("/api/v1/token", post(login))
        .route("/api/health", get(health_check));

    let protected_routes = Router::new()
        .route("/api/v1/me", get(get_me))
        .route("/api/v1/habits", get(list_habits).post(create_habit))
        .route(
            "/api/v1/habits/:id",
            get(get_habit).put(update_habit).delete(delete_habit),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    public_routes.merge(protected_routes).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenService;
    use crate::auth::password::MIN_BCRYPT_COST;
    use crate::db::manager::DatabaseManager;
    use crate::db::repository::{HabitRepository, UserRepository};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_app() -> Router {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let state = AppState {
            user_repo: Arc::new(UserRepository::new(db.clone())),
            habit_repo: Arc::new(HabitRepository::new(db)),
            tokens: Arc::new(TokenService::new("test-secret", 30).unwrap()),
            bcrypt_cost: MIN_BCRYPT_COST,
        };
        build_api_routes(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(uri: &str, method: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={}&password={}",
                username.replace('@', "%40"),
                password
            )))
            .unwrap()
    }

    async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(json_request(
                "/api/v1/users",
                "POST",
                json!({"email": email, "password": password}),
            ))
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(login_request(email, password))
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_registration_never_returns_the_hash() {
        let app = test_app();
        let (status, body) = register(&app, "a@x.com", "pw1").await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "a@x.com");
        assert!(body["id"].is_number());
        assert!(body["created_at"].is_string());
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_registration_rejects_malformed_input() {
        let app = test_app();

        let (status, _) = register(&app, "not-an-email", "pw1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = register(&app, "a@x.com", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = test_app();

        let (status, first) = register(&app, "a@x.com", "pw1").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = register(&app, "a@x.com", "pw2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already registered");

        // The first registration still logs in
        let (status, token) = login(&app, "a@x.com", "pw1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(token["access_token"].is_string());
        assert_eq!(first["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_login_issues_bearer_token() {
        let app = test_app();
        register(&app, "a@x.com", "pw1").await;

        let (status, body) = login(&app, "a@x.com", "pw1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert!(!body["access_token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_failure_is_uniform_401() {
        let app = test_app();
        register(&app, "a@x.com", "pw1").await;

        // Wrong password and unknown user produce the same status
        let wrong_pw = app.clone().oneshot(login_request("a@x.com", "wrong")).await.unwrap();
        assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_pw.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let wrong_pw_body = body_json(wrong_pw).await;

        let unknown = app.clone().oneshot(login_request("nobody@x.com", "pw1")).await.unwrap();
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        let unknown_body = body_json(unknown).await;

        assert_eq!(wrong_pw_body["message"], unknown_body["message"]);
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_token() {
        let app = test_app();

        let missing = app
            .clone()
            .oneshot(Request::builder().uri("/api/v1/habits").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            missing.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let body = body_json(missing).await;
        assert_eq!(body["message"], "Could not validate credentials");

        let garbage = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/habits")
                    .header(header::AUTHORIZATION, "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(garbage).await;
        assert_eq!(body["message"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_habit_lifecycle_scoped_to_token_subject() {
        let app = test_app();

        let (_, alice) = register(&app, "a@x.com", "pw1").await;
        let (_, alice_token) = login(&app, "a@x.com", "pw1").await;
        let alice_auth = format!("Bearer {}", alice_token["access_token"].as_str().unwrap());

        register(&app, "b@x.com", "pw2").await;
        let (_, bob_token) = login(&app, "b@x.com", "pw2").await;
        let bob_auth = format!("Bearer {}", bob_token["access_token"].as_str().unwrap());

        // Create a habit as alice; user_id matches the token's subject
        let created = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/habits")
                    .header(header::AUTHORIZATION, &alice_auth)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"name": "Meditation", "frequency": "daily"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let habit = body_json(created).await;
        assert_eq!(habit["user_id"], alice["id"]);
        let habit_id = habit["id"].as_i64().unwrap();

        // Bob asking for alice's habit sees 404, not 403
        let foreign = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/habits/{}", habit_id))
                    .header(header::AUTHORIZATION, &bob_auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

        // Alice updates then deletes her habit
        let updated = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/v1/habits/{}", habit_id))
                    .header(header::AUTHORIZATION, &alice_auth)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"streak": 5}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        let updated = body_json(updated).await;
        assert_eq!(updated["streak"], 5);
        assert_eq!(updated["name"], "Meditation");

        let deleted = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/habits/{}", habit_id))
                    .header(header::AUTHORIZATION, &alice_auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_me_returns_the_resolved_identity() {
        let app = test_app();

        let (_, user) = register(&app, "a@x.com", "pw1").await;
        let (_, token) = login(&app, "a@x.com", "pw1").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/me")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", token["access_token"].as_str().unwrap()),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], user["id"]);
        assert_eq!(body["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let app = test_app();
        let (_, user) = register(&app, "a@x.com", "pw1").await;

        // Same secret as the app state, already past expiry
        let tokens = TokenService::new("test-secret", 30).unwrap();
        let expired = tokens
            .issue_with_ttl(user["id"].as_i64().unwrap(), chrono::Duration::seconds(-60))
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/habits")
                    .header(header::AUTHORIZATION, format!("Bearer {}", expired))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_rejected() {
        let app = test_app();

        // A valid token whose subject never existed in this database
        let tokens = TokenService::new("test-secret", 30).unwrap();
        let orphaned = tokens.issue(9999).unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/habits")
                    .header(header::AUTHORIZATION, format!("Bearer {}", orphaned))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Could not validate credentials");
    }
}
