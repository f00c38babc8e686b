//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Firestore field names. These are the camelCase names the web frontend reads.
pub mod fields {
    pub const HAS_AUTHORIZED_LINKEDIN: &str = "hasAuthorizedLinkedIn";
    pub const LINKEDIN_TOKEN: &str = "linkedInToken";
    pub const LINKEDIN_TOKEN_EXPIRES_AT: &str = "linkedInTokenExpiresAt";
    pub const LINKEDIN_PERSON_ID: &str = "linkedInPersonId";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Per-user document stored in Firestore, keyed by the opaque user id.
///
/// Every field is optional on read; documents are created by the frontend
/// and only partially filled in by this service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "hasAuthorizedLinkedIn", default)]
    pub has_authorized_linkedin: bool,
    /// LinkedIn access token (plaintext bearer credential)
    #[serde(rename = "linkedInToken", default)]
    pub linkedin_token: Option<String>,
    /// Token expiry as Unix epoch milliseconds
    #[serde(rename = "linkedInTokenExpiresAt", default)]
    pub linkedin_token_expires_at: Option<i64>,
    /// LinkedIn member id, used to build the `urn:li:person:` author URN
    #[serde(rename = "linkedInPersonId", default)]
    pub linkedin_person_id: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl UserRecord {
    /// Return the stored access token if the member is authorized and the
    /// token is present and unexpired at `now_ms`.
    pub fn valid_token(&self, now_ms: i64) -> Option<&str> {
        if !self.has_authorized_linkedin {
            return None;
        }
        let token = self.linkedin_token.as_deref().filter(|t| !t.is_empty())?;
        let expires_at = self.linkedin_token_expires_at?;
        (now_ms < expires_at).then_some(token)
    }

    /// Merge a partial update into this record (fields left `None` are untouched).
    pub fn apply(&mut self, update: &LinkedInAuthUpdate) {
        if let Some(authorized) = update.has_authorized_linkedin {
            self.has_authorized_linkedin = authorized;
        }
        if let Some(token) = &update.linkedin_token {
            self.linkedin_token = Some(token.clone());
        }
        if let Some(expires_at) = update.linkedin_token_expires_at {
            self.linkedin_token_expires_at = Some(expires_at);
        }
        if let Some(person_id) = &update.linkedin_person_id {
            self.linkedin_person_id = Some(person_id.clone());
        }
        if let Some(updated_at) = &update.updated_at {
            self.updated_at = Some(updated_at.clone());
        }
    }
}

/// Merge-style partial update of a [`UserRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedInAuthUpdate {
    #[serde(
        rename = "hasAuthorizedLinkedIn",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_authorized_linkedin: Option<bool>,
    #[serde(rename = "linkedInToken", skip_serializing_if = "Option::is_none")]
    pub linkedin_token: Option<String>,
    #[serde(
        rename = "linkedInTokenExpiresAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin_token_expires_at: Option<i64>,
    #[serde(rename = "linkedInPersonId", skip_serializing_if = "Option::is_none")]
    pub linkedin_person_id: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl LinkedInAuthUpdate {
    /// Field mask for a Firestore merge: only the fields that are set.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.has_authorized_linkedin.is_some() {
            paths.push(fields::HAS_AUTHORIZED_LINKEDIN);
        }
        if self.linkedin_token.is_some() {
            paths.push(fields::LINKEDIN_TOKEN);
        }
        if self.linkedin_token_expires_at.is_some() {
            paths.push(fields::LINKEDIN_TOKEN_EXPIRES_AT);
        }
        if self.linkedin_person_id.is_some() {
            paths.push(fields::LINKEDIN_PERSON_ID);
        }
        if self.updated_at.is_some() {
            paths.push(fields::UPDATED_AT);
        }
        paths
    }
}
