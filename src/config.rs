//! Application configuration loaded from environment variables.
//!
//! Secrets (LinkedIn client secret, OpenAI key, signing keys) are read once
//! at startup and kept in memory; they are redacted from `Debug` output.

use std::env;
use std::fmt;

/// Default LinkedIn OAuth endpoint base.
pub const DEFAULT_LINKEDIN_OAUTH_URL: &str = "https://www.linkedin.com/oauth/v2";
/// Default LinkedIn REST API base.
pub const DEFAULT_LINKEDIN_API_URL: &str = "https://api.linkedin.com/v2";
/// Default OpenAI API base.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// LinkedIn OAuth client ID (public)
    pub linkedin_client_id: String,
    /// Redirect URI registered with LinkedIn for the OAuth callback
    pub linkedin_redirect_uri: String,
    /// Space-separated OAuth scopes requested from LinkedIn
    pub linkedin_scope: String,
    /// LinkedIn OAuth base URL (authorization + token exchange)
    pub linkedin_oauth_url: String,
    /// LinkedIn REST API base URL (profile + UGC posts)
    pub linkedin_api_url: String,
    /// OpenAI API base URL
    pub openai_api_url: String,
    /// OpenAI organization header, if any
    pub openai_organization: Option<String>,
    /// Completion model
    pub openai_model: String,
    /// Prompt sent for text generation
    pub generation_prompt: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Overall timeout for outbound HTTP requests
    pub http_timeout_secs: u64,
    /// Keep users in memory instead of Firestore (local development)
    pub in_memory_store: bool,

    // --- Secrets ---
    /// LinkedIn OAuth client secret
    pub linkedin_client_secret: String,
    /// OpenAI API key
    pub openai_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for the OAuth state parameter (raw bytes)
    pub oauth_state_key: Vec<u8>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("linkedin_client_id", &self.linkedin_client_id)
            .field("linkedin_redirect_uri", &self.linkedin_redirect_uri)
            .field("linkedin_scope", &self.linkedin_scope)
            .field("linkedin_oauth_url", &self.linkedin_oauth_url)
            .field("linkedin_api_url", &self.linkedin_api_url)
            .field("openai_api_url", &self.openai_api_url)
            .field("openai_organization", &self.openai_organization)
            .field("openai_model", &self.openai_model)
            .field("generation_prompt", &self.generation_prompt)
            .field("frontend_url", &self.frontend_url)
            .field("gcp_project_id", &self.gcp_project_id)
            .field("port", &self.port)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("in_memory_store", &self.in_memory_store)
            .field("linkedin_client_secret", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .field("jwt_signing_key", &"<redacted>")
            .field("oauth_state_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = required("JWT_SIGNING_KEY")?.into_bytes();
        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(|v| v.trim().as_bytes().to_vec())
            .unwrap_or_else(|_| jwt_signing_key.clone());

        Ok(Self {
            linkedin_client_id: required("LINKEDIN_CLIENT_ID")?,
            linkedin_redirect_uri: env::var("LINKEDIN_REDIRECT_URI").unwrap_or_else(|_| {
                "http://localhost:8888/auth/linkedin/callback".to_string()
            }),
            linkedin_scope: env::var("LINKEDIN_SCOPE")
                .unwrap_or_else(|_| "r_liteprofile r_emailaddress w_member_social".to_string()),
            linkedin_oauth_url: env::var("LINKEDIN_OAUTH_URL")
                .unwrap_or_else(|_| DEFAULT_LINKEDIN_OAUTH_URL.to_string()),
            linkedin_api_url: env::var("LINKEDIN_API_URL")
                .unwrap_or_else(|_| DEFAULT_LINKEDIN_API_URL.to_string()),
            openai_api_url: env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),
            openai_organization: env::var("OPENAI_ORGANIZATION")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo-instruct".to_string()),
            generation_prompt: env::var("GENERATION_PROMPT")
                .unwrap_or_else(|_| "Fais moi une blague.".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://tldl.fr".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8888".to_string())
                .parse()
                .unwrap_or(8888),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            in_memory_store: env::var("IN_MEMORY_STORE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),

            linkedin_client_secret: required("LINKEDIN_CLIENT_SECRET")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            jwt_signing_key,
            oauth_state_key,
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            linkedin_client_id: "test_client_id".to_string(),
            linkedin_redirect_uri: "http://localhost:8888/auth/linkedin/callback".to_string(),
            linkedin_scope: "r_liteprofile r_emailaddress w_member_social".to_string(),
            linkedin_oauth_url: DEFAULT_LINKEDIN_OAUTH_URL.to_string(),
            linkedin_api_url: DEFAULT_LINKEDIN_API_URL.to_string(),
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            openai_organization: None,
            openai_model: "gpt-3.5-turbo-instruct".to_string(),
            generation_prompt: "Fais moi une blague.".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8888,
            http_timeout_secs: 5,
            in_memory_store: true,
            linkedin_client_secret: "test_secret".to_string(),
            openai_api_key: "test_openai_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_state_key".to_vec(),
        }
    }
}

/// Read a required variable, trimming whitespace that secret bindings tend to add.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
