// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use std::sync::Arc;
use tldl_api::config::Config;
use tldl_api::db::FirestoreDb;
use tldl_api::middleware::auth::create_jwt;
use tldl_api::routes::create_router;
use tldl_api::AppState;
use wiremock::MockServer;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// App wired to an in-memory store and a single mock server that stands in
/// for both LinkedIn and OpenAI.
#[allow(dead_code)]
pub struct TestApp {
    pub app: axum::Router,
    pub state: Arc<AppState>,
    pub upstream: MockServer,
}

/// Config pointing every upstream at `upstream`.
#[allow(dead_code)]
pub fn mock_config(upstream: &MockServer) -> Config {
    let mut config = Config::test_default();
    config.linkedin_oauth_url = format!("{}/oauth/v2", upstream.uri());
    config.linkedin_api_url = format!("{}/v2", upstream.uri());
    config.openai_api_url = format!("{}/v1", upstream.uri());
    config
}

/// Create a test app with an in-memory user store.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    let upstream = MockServer::start().await;
    let config = mock_config(&upstream);
    let state = Arc::new(
        AppState::new(config, FirestoreDb::new_in_memory()).expect("Failed to build state"),
    );

    TestApp {
        app: create_router(state.clone()),
        state,
        upstream,
    }
}

/// Create a test app whose database is offline.
#[allow(dead_code)]
pub async fn create_offline_test_app() -> TestApp {
    let upstream = MockServer::start().await;
    let config = mock_config(&upstream);
    let state =
        Arc::new(AppState::new(config, FirestoreDb::new_mock()).expect("Failed to build state"));

    TestApp {
        app: create_router(state.clone()),
        state,
        upstream,
    }
}

/// Session token for `uid` signed with the app's key.
#[allow(dead_code)]
pub fn test_jwt(state: &AppState, uid: &str) -> String {
    create_jwt(uid, &state.config.jwt_signing_key).expect("Failed to sign JWT")
}

/// Build a GET request with a bearer session.
#[allow(dead_code)]
pub fn authed_get(uri: &str, jwt: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
        .body(Body::empty())
        .unwrap()
}

/// Build a JSON POST request with a bearer session.
#[allow(dead_code)]
pub fn authed_post_json(uri: &str, jwt: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the `Location` header of a redirect.
#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}
