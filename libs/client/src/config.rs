//! Client configuration

use std::env;

/// Default API location when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Where and how the client reaches the API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash
    pub api_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout_seconds: 10,
        }
    }

    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_URL`: API base URL (default: `http://localhost:8080`)
    /// - `API_TIMEOUT_SECONDS`: Request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        let api_url = env::var("API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_seconds = env::var("API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Self {
            timeout_seconds,
            ..Self::new(api_url)
        }
    }
}
