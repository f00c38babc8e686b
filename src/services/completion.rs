// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenAI completions client used to generate post text.

use crate::config::Config;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f64 = 0.5;

/// Completion API client.
#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    organization: Option<String>,
    model: String,
    prompt: String,
}

/// Request body for `/completions`.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

/// A single generated completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl CompletionClient {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.openai_api_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            organization: config.openai_organization.clone(),
            model: config.openai_model.clone(),
            prompt: config.generation_prompt.clone(),
        }
    }

    /// Generate text for the configured prompt and return the first choice.
    pub async fn generate(&self) -> Result<CompletionChoice, AppError> {
        let url = format!("{}/completions", self.base_url);

        let body = CompletionRequest {
            model: &self.model,
            prompt: &self.prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            n: 1,
        };

        let mut request = self.http.post(&url).bearer_auth(&self.api_key).json(&body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::CompletionApi(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            tracing::error!(status = %status, error = %message, "Completion API request failed");
            return Err(AppError::CompletionApi(format!("HTTP {}: {}", status, message)));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::CompletionApi(format!("JSON parse error: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::CompletionApi("Completion returned no choices".to_string()))?;

        tracing::debug!(
            model = %self.model,
            finish_reason = ?choice.finish_reason,
            "Completion generated"
        );

        Ok(choice)
    }
}
