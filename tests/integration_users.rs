mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use stead::router::init_router;
use stead::state::AppState;
use stead::utils::jwt::Claim;
use tower::ServiceExt;
use uuid::Uuid;

use common::{create_test_user, generate_unique_email, test_state};

fn setup(pool: PgPool) -> (Router, AppState) {
    let state = test_state(pool);
    (init_router(state.clone()), state)
}

fn access_token(state: &AppState, user_id: Uuid) -> String {
    state
        .tokens
        .mint(
            Claim::Access { user_id },
            Some(state.jwt_config.access_token_expiry),
        )
        .unwrap()
}

fn get_profile(token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn patch_profile(token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_profile_returns_user_without_hash(pool: PgPool) {
    let user = create_test_user(&pool, &generate_unique_email(), "testpass123", true).await;
    let (app, state) = setup(pool);

    let token = access_token(&state, user.id);
    let response = app.oneshot(get_profile(&token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["email"], user.email);
    assert!(body.get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_profile_requires_token(pool: PgPool) {
    let (app, _state) = setup(pool);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_profile_rejects_refresh_token_as_bearer(pool: PgPool) {
    let user = create_test_user(&pool, &generate_unique_email(), "testpass123", true).await;
    let (app, state) = setup(pool);

    // Valid refresh token, wrong place: only access claims open this door.
    let refresh = state
        .refresh_tokens
        .mint(Claim::Refresh { user_id: user.id }, Some(3600))
        .unwrap();

    let response = app.oneshot(get_profile(&refresh)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_profile_rejects_recovery_token_as_bearer(pool: PgPool) {
    let user = create_test_user(&pool, &generate_unique_email(), "testpass123", true).await;
    let (app, state) = setup(pool);

    let recovery = state
        .tokens
        .mint(
            Claim::Recovery {
                email: user.email.clone(),
            },
            Some(300),
        )
        .unwrap();

    let response = app.oneshot(get_profile(&recovery)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_changes_username(pool: PgPool) {
    let user = create_test_user(&pool, &generate_unique_email(), "testpass123", true).await;
    let (app, state) = setup(pool);

    let token = access_token(&state, user.id);
    let response = app
        .oneshot(patch_profile(&token, &json!({ "username": "renamed-user" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["username"], "renamed-user");
    assert_eq!(body["email"], user.email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_conflicts_on_taken_username(pool: PgPool) {
    let other = create_test_user(&pool, &generate_unique_email(), "testpass123", true).await;
    let user = create_test_user(&pool, &generate_unique_email(), "testpass123", true).await;
    let (app, state) = setup(pool);

    let token = access_token(&state, user.id);
    let response = app
        .oneshot(patch_profile(&token, &json!({ "username": other.username })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_password_changes_signin(pool: PgPool) {
    let user = create_test_user(&pool, &generate_unique_email(), "oldpass123", true).await;
    let (app, state) = setup(pool);

    let token = access_token(&state, user.id);
    let response = app
        .clone()
        .oneshot(patch_profile(&token, &json!({ "password": "newpass456" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let signin = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signin")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "email": user.email,
                        "password": "newpass456"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(signin.status(), StatusCode::OK);
}
