// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth start tests.
//!
//! These tests verify that the authorization redirect carries a signed
//! state that decodes back to the session's user id, and that the flow
//! cannot be started without a session.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tldl_api::routes::auth::verify_and_decode_state;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod common;
use common::{authed_get, body_json, create_test_app, location, test_jwt};

fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| urlencoding::decode(value).ok().map(|v| v.into_owned()))?
    })
}

#[tokio::test]
async fn test_auth_start_redirects_to_linkedin() {
    let test = create_test_app().await;
    let jwt = test_jwt(&test.state, "user-77");

    let response = test
        .app
        .clone()
        .oneshot(authed_get("/auth/linkedin", &jwt))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let url = location(&response);

    assert!(url.starts_with(&format!(
        "{}/authorization?",
        test.state.config.linkedin_oauth_url
    )));
    assert_eq!(query_param(&url, "response_type").as_deref(), Some("code"));
    assert_eq!(
        query_param(&url, "client_id").as_deref(),
        Some("test_client_id")
    );
    assert_eq!(
        query_param(&url, "redirect_uri"),
        Some(test.state.config.linkedin_redirect_uri.clone())
    );
    assert_eq!(
        query_param(&url, "scope"),
        Some(test.state.config.linkedin_scope.clone())
    );

    let state = query_param(&url, "state").expect("state parameter");
    assert_eq!(
        verify_and_decode_state(&state, &test.state.config.oauth_state_key),
        Some("user-77".to_string())
    );
}

#[tokio::test]
async fn test_auth_start_state_is_url_safe() {
    let test = create_test_app().await;
    let jwt = test_jwt(&test.state, "some/user+id");

    let response = test
        .app
        .clone()
        .oneshot(authed_get("/auth/linkedin", &jwt))
        .await
        .unwrap();

    let state = query_param(&location(&response), "state").unwrap();
    assert!(!state.contains('+'), "State should not contain '+'");
    assert!(!state.contains('/'), "State should not contain '/'");
    assert!(!state.contains('='), "State should not contain '=' padding");
    assert_eq!(
        verify_and_decode_state(&state, &test.state.config.oauth_state_key),
        Some("some/user+id".to_string())
    );
}

#[tokio::test]
async fn test_auth_start_requires_session() {
    let test = create_test_app().await;

    for uri in ["/auth/linkedin", "/auth/linkedin?uid=victim"] {
        let response = test
            .app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri {}", uri);
        assert!(response.headers().get("location").is_none());
    }
}

#[tokio::test]
async fn test_auth_start_ignores_uid_query() {
    let test = create_test_app().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "caller-token",
            "expires_in": 3600
        })))
        .mount(&test.upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "caller-person"
        })))
        .mount(&test.upstream)
        .await;

    let jwt = test_jwt(&test.state, "caller");
    let response = test
        .app
        .clone()
        .oneshot(authed_get("/auth/linkedin?uid=victim", &jwt))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let state = query_param(&location(&response), "state").unwrap();
    assert_eq!(
        verify_and_decode_state(&state, &test.state.config.oauth_state_key),
        Some("caller".to_string())
    );

    // Completing the flow binds the LinkedIn account to the session's user only
    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/auth/linkedin/callback?code=c&state={}", state))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    assert!(test.state.db.get_user("victim").await.unwrap().is_none());
    let caller = test.state.db.get_user("caller").await.unwrap().unwrap();
    assert_eq!(caller.linkedin_token.as_deref(), Some("caller-token"));
    assert_eq!(caller.linkedin_person_id.as_deref(), Some("caller-person"));

    let response = test
        .app
        .clone()
        .oneshot(authed_get("/auth/linkedin/status", &test_jwt(&test.state, "victim")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["authorized"], false);
}
