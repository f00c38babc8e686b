// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn OAuth authorization routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{delete, get},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::time_utils::format_millis_rfc3339;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Public OAuth routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/linkedin/callback", get(auth_callback))
}

/// Routes that need a session (mounted behind `require_auth`).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/linkedin", get(auth_start))
        .route("/auth/linkedin/status", get(auth_status))
        .route("/auth/linkedin/authorization", delete(disconnect))
}

/// Start OAuth flow - redirect to LinkedIn authorization.
///
/// The authorization is bound to the session's user; the signed state is the
/// only way the callback learns which user document to write.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Redirect> {
    let oauth_state = sign_state(&user.uid, &state.config.oauth_state_key)?;
    let auth_url = state.linkedin_service.authorization_url(&oauth_state);

    tracing::info!(uid = %user.uid, "Starting OAuth flow, redirecting to LinkedIn");

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback - exchange code for a token, persist authorization, create session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let frontend_url = state.config.frontend_url.trim_end_matches('/');

    // Member declined or LinkedIn reported a problem
    if let Some(error) = params.error {
        tracing::warn!(
            error = %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "OAuth error from LinkedIn"
        );
        let redirect = format!(
            "{}/generate?error={}",
            frontend_url,
            urlencoding::encode(&error)
        );
        return Ok(Redirect::temporary(&redirect));
    }

    let uid = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key))
        .ok_or_else(|| {
            tracing::warn!("Invalid or tampered OAuth state parameter");
            AppError::BadRequest("Invalid state parameter".to_string())
        })?;

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let oauth_result = state
        .linkedin_service
        .handle_oauth_callback(&uid, &code)
        .await
        .inspect_err(|e| tracing::error!(uid = %uid, error = %e, "Error during LinkedIn callback"))?;

    // Create JWT session token
    let jwt = create_jwt(&oauth_result.uid, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    // Redirect to frontend with token
    let redirect_url = format!("{}/generate?token={}", frontend_url, jwt);

    Ok(Redirect::temporary(&redirect_url))
}

/// Authorization status response.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStatusResponse {
    pub authorized: bool,
    pub token_valid: bool,
    pub expires_at: Option<String>,
}

/// Report whether the session's user has a usable LinkedIn authorization.
async fn auth_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AuthStatusResponse>> {
    let record = state.db.get_user(&user.uid).await?.unwrap_or_default();
    let token_valid = state.linkedin_service.verify_token(&user.uid).await?;

    Ok(Json(AuthStatusResponse {
        authorized: record.has_authorized_linkedin,
        token_valid,
        expires_at: record
            .linkedin_token_expires_at
            .and_then(format_millis_rfc3339),
    }))
}

/// Disconnect response.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DisconnectResponse {
    pub authorized: bool,
}

/// Clear the LinkedIn authorization flag for the session's user.
async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DisconnectResponse>> {
    state
        .linkedin_service
        .set_authorization(&user.uid, false)
        .await?;

    Ok(Json(DisconnectResponse { authorized: false }))
}

/// Sign a user id into an OAuth state value: base64url("uid|timestamp_hex|signature_hex").
pub fn sign_state(uid: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{}|{:x}", uid, timestamp);
    let signature = state_signature(&payload, secret)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("HMAC init failed")))?;

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature).as_bytes()))
}

/// Verify the HMAC signature on an OAuth state value and return the user id.
pub fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Split from the right so a `|` inside the uid cannot shift the fields
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let uid = parts.next()?;

    if uid.is_empty() || u128::from_str_radix(timestamp_hex, 16).is_err() {
        return None;
    }

    let payload = format!("{}|{}", uid, timestamp_hex);
    let expected = state_signature(&payload, secret)?;

    if !bool::from(expected.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(uid.to_string())
}

fn state_signature(payload: &str, secret: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}
