// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! TL;DL API: LinkedIn authorization broker and post relay
//!
//! This crate provides the backend API that links a user's LinkedIn
//! account, generates post text through OpenAI and shares posts on the
//! user's behalf.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use error::AppError;
use services::{CompletionClient, LinkedInService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub linkedin_service: LinkedInService,
    pub completion_client: CompletionClient,
}

impl AppState {
    /// Build the state, wiring one shared HTTP client into both upstream clients.
    pub fn new(config: Config, db: FirestoreDb) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        let linkedin_service = LinkedInService::new(&config, http.clone(), db.clone());
        let completion_client = CompletionClient::new(&config, http);

        Ok(Self {
            config,
            db,
            linkedin_service,
            completion_client,
        })
    }
}
