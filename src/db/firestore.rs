// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for user documents:
//! - Reading a user's LinkedIn authorization state
//! - Merge-style partial updates keyed by user id (last write wins)
//!
//! Besides live Firestore (or the emulator), the wrapper can run against an
//! in-memory map for tests and local development, or in an offline mode where
//! every operation fails.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{LinkedInAuthUpdate, UserRecord};
use crate::time_utils::format_utc_rfc3339;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<DashMap<String, UserRecord>>),
    Offline,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory store. Clones share the same map.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user document by id.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(uid)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(users) => Ok(users.get(uid).map(|entry| entry.value().clone())),
            Backend::Offline => Err(offline()),
        }
    }

    /// Merge a partial update into a user document, creating it if absent.
    ///
    /// Only the fields set on `update` are written. Returns the merged document.
    pub async fn merge_user(
        &self,
        uid: &str,
        update: &LinkedInAuthUpdate,
    ) -> Result<UserRecord, AppError> {
        if uid.is_empty() {
            return Err(AppError::BadRequest("User id must not be empty".to_string()));
        }

        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .update()
                .fields(update.field_paths())
                .in_col(collections::USERS)
                .document_id(uid)
                .object(update)
                .execute::<UserRecord>()
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(users) => {
                let mut entry = users.entry(uid.to_string()).or_default();
                entry.apply(update);
                Ok(entry.value().clone())
            }
            Backend::Offline => Err(offline()),
        }
    }

    /// Set only the LinkedIn authorization flag for a user.
    pub async fn set_linkedin_authorization(
        &self,
        uid: &str,
        authorized: bool,
    ) -> Result<(), AppError> {
        let update = LinkedInAuthUpdate {
            has_authorized_linkedin: Some(authorized),
            updated_at: Some(format_utc_rfc3339(chrono::Utc::now())),
            ..Default::default()
        };

        self.merge_user(uid, &update).await?;
        tracing::info!(uid = %uid, authorized, "LinkedIn authorization updated");
        Ok(())
    }
}

fn offline() -> AppError {
    AppError::Database("Database not connected (offline mode)".to_string())
}
