// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post generation and sharing routes (session required).

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::CompletionChoice;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest commentary LinkedIn accepts on a UGC post.
const MAX_SHARE_TEXT_CHARS: usize = 3000;

/// Post routes. The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts/generate", get(generate))
        .route("/posts/share", post(share))
}

/// Generate post text from the configured prompt.
async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CompletionChoice>> {
    tracing::info!(uid = %user.uid, "Generating post text");
    let choice = state.completion_client.generate().await?;
    Ok(Json(choice))
}

/// Share request body.
#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SharePostRequest {
    pub text: String,
}

/// Share response.
#[derive(Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SharePostResponse {
    /// URN of the created post
    pub id: String,
}

/// Share text publicly on the user's LinkedIn feed.
async fn share(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SharePostRequest>,
) -> Result<Json<SharePostResponse>> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Post text must not be empty".to_string()));
    }
    if text.chars().count() > MAX_SHARE_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Post text exceeds {} characters",
            MAX_SHARE_TEXT_CHARS
        )));
    }

    let id = state.linkedin_service.share_post(&user.uid, text).await?;
    Ok(Json(SharePostResponse { id }))
}
