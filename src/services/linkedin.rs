// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn API client for OAuth, profile lookup and UGC sharing.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization code exchange
//! - Minimal profile fetch (member id)
//! - UGC post submission

use crate::config::Config;
use crate::error::AppError;
use serde::Deserialize;

/// Protocol version header required by the UGC posts endpoint.
const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

/// LinkedIn API client.
#[derive(Clone)]
pub struct LinkedInClient {
    http: reqwest::Client,
    oauth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
}

impl LinkedInClient {
    /// Create a new LinkedIn client with OAuth credentials from config.
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            oauth_url: config.linkedin_oauth_url.trim_end_matches('/').to_string(),
            api_url: config.linkedin_api_url.trim_end_matches('/').to_string(),
            client_id: config.linkedin_client_id.clone(),
            client_secret: config.linkedin_client_secret.clone(),
            redirect_uri: config.linkedin_redirect_uri.clone(),
            scope: config.linkedin_scope.clone(),
        }
    }

    /// Build the URL the user is sent to for granting access.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}/authorization?\
             response_type=code&\
             client_id={}&\
             redirect_uri={}&\
             scope={}&\
             state={}",
            self.oauth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let url = format!("{}/accessToken", self.oauth_url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "LinkedIn token exchange failed");
            return Err(AppError::LinkedInApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Failed to parse token response: {}", e)))
    }

    /// Get the authenticated member's lite profile.
    pub async fn get_profile(&self, access_token: &str) -> Result<LinkedInProfile, AppError> {
        let url = format!("{}/me", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Profile request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Submit a UGC share and return the created post URN.
    pub async fn share(
        &self,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> Result<String, AppError> {
        let url = format!("{}/ugcPosts", self.api_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL_VERSION)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("Share request failed: {}", e)))?;

        let response = self.check_status(response).await?;

        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());
        if let Some(id) = header_id {
            return Ok(id);
        }

        let body: ShareResponse = response
            .json()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("JSON parse error: {}", e)))?;

        body.id
            .ok_or_else(|| AppError::LinkedInApi("Share response missing post id".to_string()))
    }

    /// Check response status and return error if not successful.
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            tracing::warn!("LinkedIn rejected access token (401)");
            return Err(AppError::LinkedInReauthorizationRequired);
        }

        if status.as_u16() == 429 {
            tracing::warn!("LinkedIn rate limit hit (429)");
        }

        Err(AppError::LinkedInApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        self.check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::LinkedInApi(format!("JSON parse error: {}", e)))
    }
}

/// Token exchange response from LinkedIn OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Lite profile returned by `/me`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInProfile {
    pub id: String,
    #[serde(default)]
    pub localized_first_name: Option<String>,
    #[serde(default)]
    pub localized_last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShareResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Build the UGC share body for a public text-only post.
pub fn build_share_payload(person_id: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "author": format!("urn:li:person:{}", person_id),
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": {
                "shareCommentary": {
                    "text": text
                },
                "shareMediaCategory": "NONE"
            }
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// LinkedInService - High-level service tying the client to the user store
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::FirestoreDb;
use crate::models::LinkedInAuthUpdate;
use crate::time_utils::{format_utc_rfc3339, now_millis};

/// High-level LinkedIn service.
///
/// All per-user state (token, expiry, member id) lives on the user's
/// document and is passed explicitly through each call; nothing is cached
/// between requests.
#[derive(Clone)]
pub struct LinkedInService {
    client: LinkedInClient,
    db: FirestoreDb,
}

impl LinkedInService {
    pub fn new(config: &Config, http: reqwest::Client, db: FirestoreDb) -> Self {
        Self {
            client: LinkedInClient::new(config, http),
            db,
        }
    }

    pub fn authorization_url(&self, state: &str) -> String {
        self.client.authorization_url(state)
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Handle OAuth callback: exchange code, fetch profile, persist authorization.
    pub async fn handle_oauth_callback(
        &self,
        uid: &str,
        code: &str,
    ) -> Result<OAuthResult, AppError> {
        tracing::info!(uid = %uid, "Retrieving access token from LinkedIn");
        let token_response = self.client.exchange_code(code).await?;

        tracing::info!(uid = %uid, "Retrieving profile from LinkedIn");
        let profile = self.client.get_profile(&token_response.access_token).await?;

        let expires_at = now_millis().saturating_add(token_response.expires_in.saturating_mul(1000));

        let update = LinkedInAuthUpdate {
            has_authorized_linkedin: Some(true),
            linkedin_token: Some(token_response.access_token.clone()),
            linkedin_token_expires_at: Some(expires_at),
            linkedin_person_id: Some(profile.id.clone()),
            updated_at: Some(format_utc_rfc3339(chrono::Utc::now())),
        };

        self.db.merge_user(uid, &update).await?;

        tracing::info!(
            uid = %uid,
            person_id = %profile.id,
            "OAuth callback handled, LinkedIn authorization stored"
        );

        Ok(OAuthResult {
            uid: uid.to_string(),
            person_id: profile.id,
            expires_at,
        })
    }

    // ─── Token Maintenance ───────────────────────────────────────────────────

    /// Whether the stored LinkedIn token for `uid` exists and has not expired.
    pub async fn verify_token(&self, uid: &str) -> Result<bool, AppError> {
        let valid = self
            .db
            .get_user(uid)
            .await?
            .map(|user| user.valid_token(now_millis()).is_some())
            .unwrap_or(false);
        Ok(valid)
    }

    /// Refresh the stored LinkedIn token.
    ///
    /// Always returns `Ok(None)` and leaves the user document untouched: the
    /// member must go through the authorization flow again to obtain a token.
    // TODO: implement programmatic refresh once the app is approved for
    // LinkedIn refresh tokens (requires storing `refresh_token` at callback).
    pub async fn refresh_token(&self, uid: &str) -> Result<Option<String>, AppError> {
        tracing::debug!(uid = %uid, "LinkedIn token refresh not supported");
        Ok(None)
    }

    // ─── Sharing ─────────────────────────────────────────────────────────────

    /// Share `text` publicly on the member's feed. Returns the post URN.
    pub async fn share_post(&self, uid: &str, text: &str) -> Result<String, AppError> {
        let user = self
            .db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", uid)))?;

        let access_token = match user.valid_token(now_millis()) {
            Some(token) => token.to_string(),
            None => {
                tracing::info!(uid = %uid, "LinkedIn token missing or expired");
                self.refresh_token(uid)
                    .await?
                    .ok_or(AppError::LinkedInReauthorizationRequired)?
            }
        };

        let person_id = user
            .linkedin_person_id
            .as_deref()
            .ok_or(AppError::LinkedInReauthorizationRequired)?;

        let payload = build_share_payload(person_id, text);
        let post_id = self.client.share(&access_token, &payload).await?;

        tracing::info!(uid = %uid, post_id = %post_id, "Share posted successfully");
        Ok(post_id)
    }

    /// Set or clear the authorization flag.
    pub async fn set_authorization(&self, uid: &str, authorized: bool) -> Result<(), AppError> {
        self.db.set_linkedin_authorization(uid, authorized).await
    }
}

/// Result of handling OAuth callback.
#[derive(Debug, Clone)]
pub struct OAuthResult {
    pub uid: String,
    pub person_id: String,
    /// Token expiry as Unix epoch milliseconds
    pub expires_at: i64,
}
