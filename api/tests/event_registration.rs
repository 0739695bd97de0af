//! End-to-end registration flow against the full router, backed by the
//! in-memory repositories.

use adapter::repository::memory::{
    AuthRepositoryMemory, EventRepositoryMemory, HealthCheckRepositoryMemory, UserRepositoryMemory,
};
use api::route::v1;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use registry::AppRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let users = Arc::new(UserRepositoryMemory::new());
    let registry = AppRegistry::from_parts(
        Arc::new(HealthCheckRepositoryMemory),
        Arc::new(EventRepositoryMemory::new()),
        users.clone(),
        Arc::new(AuthRepositoryMemory::new(users)),
    );
    v1::routes().with_state(registry)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(
            body.map(|b| b.to_string()).unwrap_or_default(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Signs an account up and returns its access token.
async fn signup(app: &Router, name: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{name}@example.com"),
            "password": "pw-for-tests",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["accessToken"].as_str().unwrap().to_string()
}

async fn create_event(app: &Router, token: &str, required_workers: i32) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/events",
        Some(token),
        Some(json!({
            "title": "Community Workshop",
            "description": "Load-in and ushering.",
            "date": "2025-01-25T10:00:00Z",
            "requiredWorkers": required_workers,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["eventId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn workers_fill_an_event_up_to_its_quota() {
    let app = app();
    let manager = signup(&app, "margaret", "manager").await;
    let worker_a = signup(&app, "ada", "worker").await;
    let worker_b = signup(&app, "grace", "worker").await;
    let worker_c = signup(&app, "edsger", "worker").await;
    let event_id = create_event(&app, &manager, 2).await;
    let register_uri = format!("/api/v1/events/{event_id}/register");
    let unregister_uri = format!("/api/v1/events/{event_id}/unregister");

    let (status, body) = send(&app, Method::POST, &register_uri, Some(&worker_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registeredWorkers"].as_array().unwrap().len(), 1);
    assert_eq!(body["isFull"], json!(false));

    let (status, body) = send(&app, Method::POST, &register_uri, Some(&worker_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registeredWorkers"].as_array().unwrap().len(), 2);
    assert_eq!(body["isFull"], json!(true));

    // Quota reached: the third worker is turned away with a capacity message.
    let (status, body) = send(&app, Method::POST, &register_uri, Some(&worker_c), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("capacity"));

    // A slot frees up and the third worker gets in.
    let (status, _) = send(&app, Method::POST, &unregister_uri, Some(&worker_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, &register_uri, Some(&worker_c), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registeredWorkers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_registration_is_rejected_with_a_named_invariant() {
    let app = app();
    let manager = signup(&app, "margaret", "manager").await;
    let worker = signup(&app, "ada", "worker").await;
    let event_id = create_event(&app, &manager, 3).await;
    let register_uri = format!("/api/v1/events/{event_id}/register");

    let (status, _) = send(&app, Method::POST, &register_uri, Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, &register_uri, Some(&worker), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn unregistering_a_worker_who_never_joined_is_an_error() {
    let app = app();
    let manager = signup(&app, "margaret", "manager").await;
    let worker = signup(&app, "ada", "worker").await;
    let event_id = create_event(&app, &manager, 2).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/events/{event_id}/unregister"),
        Some(&worker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("not registered"));
}

#[tokio::test]
async fn only_managers_can_create_update_or_delete_events() {
    let app = app();
    let manager = signup(&app, "margaret", "manager").await;
    let worker = signup(&app, "ada", "worker").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/events",
        Some(&worker),
        Some(json!({
            "title": "Not allowed",
            "description": "",
            "date": "2025-01-25T10:00:00Z",
            "requiredWorkers": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let event_id = create_event(&app, &manager, 1).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/events/{event_id}"),
        Some(&worker),
        Some(json!({ "title": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/events/{event_id}"),
        Some(&worker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn requests_without_a_valid_token_are_unauthorized() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/events",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn event_lookup_distinguishes_missing_from_present() {
    let app = app();
    let manager = signup(&app, "margaret", "manager").await;
    let event_id = create_event(&app, &manager, 5).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/events/{event_id}"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("Community Workshop"));
    assert_eq!(body["requiredWorkers"], json!(5));

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/events/00000000-0000-0000-0000-000000000000",
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/api/v1/events", Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn lowering_the_quota_keeps_registered_workers_but_blocks_new_ones() {
    let app = app();
    let manager = signup(&app, "margaret", "manager").await;
    let worker_a = signup(&app, "ada", "worker").await;
    let worker_b = signup(&app, "grace", "worker").await;
    let event_id = create_event(&app, &manager, 2).await;
    let register_uri = format!("/api/v1/events/{event_id}/register");

    for token in [&worker_a, &worker_b] {
        let (status, _) = send(&app, Method::POST, &register_uri, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/events/{event_id}"),
        Some(&manager),
        Some(json!({ "requiredWorkers": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Both workers are still on the roster.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/events/{event_id}"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registeredWorkers"].as_array().unwrap().len(), 2);
    assert_eq!(body["requiredWorkers"], json!(1));

    let worker_c = signup(&app, "edsger", "worker").await;
    let (status, body) = send(&app, Method::POST, &register_uri, Some(&worker_c), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("capacity"));
}
