//! End-to-end tests of the HTTP API against a simulated clock.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};
use session_token::credentials::{CredentialStore, InMemoryCredentialStore};
use session_token::http::{AppState, router};
use session_token::{Clock, ManualClock, SigningKey};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
    let store: Arc<dyn CredentialStore> =
        Arc::new(InMemoryCredentialStore::new().with_user("alice", "pw").unwrap());
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let state = AppState::new(
        &SigningKey::new(b"http-test-secret".to_vec()).unwrap(),
        std::time::Duration::from_secs(300),
        std::time::Duration::from_secs(30),
        shared,
        store,
    );
    (router(state), clock)
}

async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn expires_at(body: &Value) -> DateTime<Utc> {
    body["expiresAt"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_signin_welcome_refresh_scenario() {
    let (app, clock) = app();
    let start = clock.now();

    let (status, body) = post(&app, "/signin", r#"{"username":"alice","password":"pw"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let t1 = body["token"].as_str().unwrap().to_string();
    assert_eq!(expires_at(&body), start + Duration::minutes(5));

    let (status, body) = post(&app, "/welcome", &json!({ "token": t1 }).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome alice!");

    let (status, body) = post(&app, "/refresh", &json!({ "token": t1 }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REFRESH_TOO_EARLY");
    assert!(body["message"].as_str().unwrap().contains("retry"));
    let retry_at: DateTime<Utc> = body["retryAt"].as_str().unwrap().parse().unwrap();
    assert_eq!(retry_at, start + Duration::seconds(270));

    clock.advance(Duration::minutes(4) + Duration::seconds(45));

    let (status, body) = post(&app, "/refresh", &json!({ "token": t1 }).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let t2 = body["token"].as_str().unwrap().to_string();
    assert_ne!(t1, t2);
    assert_eq!(expires_at(&body), clock.now() + Duration::minutes(5));

    let (_, body) = post(&app, "/welcome", &json!({ "token": t2 }).to_string()).await;
    assert_eq!(body["message"], "Welcome alice!");
}

#[tokio::test]
async fn test_signin_wrong_password() {
    let (app, _) = app();
    let (status, body) = post(&app, "/signin", r#"{"username":"alice","password":"nope"}"#).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTHENTICATION_FAILED");
}

#[tokio::test]
async fn test_signin_unknown_user_same_as_wrong_password() {
    let (app, _) = app();
    let (_, unknown) = post(&app, "/signin", r#"{"username":"bob","password":"pw"}"#).await;
    let (_, wrong) = post(&app, "/signin", r#"{"username":"alice","password":"x"}"#).await;

    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn test_signin_malformed_body() {
    let (app, _) = app();
    let (status, body) = post(&app, "/signin", r#"{"username": 42}"#).await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_welcome_without_token() {
    let (app, _) = app();
    let (status, body) = post(&app, "/welcome", "{}").await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["message"], "Invalid request: Token must be supplied");
}

#[tokio::test]
async fn test_welcome_error_kinds() {
    let (app, clock) = app();
    let (_, body) = post(&app, "/signin", r#"{"username":"alice","password":"pw"}"#).await;
    let token = body["token"].as_str().unwrap().to_string();

    let (_, body) = post(&app, "/welcome", r#"{"token":"garbage"}"#).await;
    assert_eq!(body["code"], "TOKEN_MALFORMED");

    let (rest, _) = token.rsplit_once('.').unwrap();
    let forged = format!("{rest}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    let (_, body) = post(&app, "/welcome", &json!({ "token": forged }).to_string()).await;
    assert_eq!(body["code"], "TOKEN_SIGNATURE_INVALID");

    clock.advance(Duration::minutes(10));
    let (status, body) = post(&app, "/welcome", &json!({ "token": token }).to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");

    let (_, body) = post(&app, "/refresh", &json!({ "token": token }).to_string()).await;
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let _ = post(&app, "/signin", r#"{"username":"alice","password":"pw"}"#).await;
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains("session_token_tokens_issued_total"));
}
