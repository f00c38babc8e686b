// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TL;DL API Server
//!
//! Links LinkedIn accounts, generates post text and shares posts
//! on behalf of authorized users.

use std::sync::Arc;
use tldl_api::{config::Config, db::FirestoreDb, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting TL;DL API");

    // Initialize the user store
    let db = if config.in_memory_store {
        tracing::warn!("Using in-memory user store, data will not survive restarts");
        FirestoreDb::new_in_memory()
    } else {
        FirestoreDb::new(&config.gcp_project_id).await?
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db)?);

    // Build router
    let app = tldl_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tldl_api=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
