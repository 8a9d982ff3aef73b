//! Client configuration

use std::path::PathBuf;

/// Default backend base path
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/web";

/// Client configuration for connecting to the reservation backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL including the API prefix (e.g. "http://localhost:8000/api/web")
    pub base_url: String,

    /// Request timeout in seconds; `None` keeps the transport default
    pub timeout: Option<u64>,

    /// File where the session is persisted between runs
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            session_file: None,
        }
    }

    /// Read configuration from the environment
    ///
    /// - `CARAL_API_URL`: base URL (default [`DEFAULT_BASE_URL`])
    /// - `CARAL_HTTP_TIMEOUT_SECS`: request timeout in seconds
    /// - `CARAL_SESSION_FILE`: session persistence file
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CARAL_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            timeout: std::env::var("CARAL_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok()),
            session_file: std::env::var("CARAL_SESSION_FILE").ok().map(PathBuf::from),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Persist the session to `path`
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
