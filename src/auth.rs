//! Authentication provider for the Quarry client.
//!
//! Handles account API keys and HTTP Basic Auth, attaching the appropriate
//! headers to HTTP requests.

use crate::error::Result;
use base64::{engine::general_purpose, Engine as _};

/// Authentication credentials for a Quarry engine.
///
/// # Examples
///
/// ```rust
/// use quarry_link::AuthProvider;
///
/// // Account API key (recommended)
/// let auth = AuthProvider::api_key("1/0123456789abcdef".to_string());
///
/// // HTTP Basic Auth
/// let auth = AuthProvider::basic_auth("alice".to_string(), "secret".to_string());
///
/// // No authentication (local development engines)
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone)]
pub enum AuthProvider {
    /// Account API key
    ApiKey(String),

    /// HTTP Basic Auth (username, password)
    BasicAuth(String, String),

    /// No authentication
    None,
}

impl AuthProvider {
    /// Create API-key authentication
    pub fn api_key(key: String) -> Self {
        Self::ApiKey(key)
    }

    /// Create HTTP Basic Auth
    ///
    /// Encodes username:password as base64 for the Authorization: Basic
    /// header following RFC 7617.
    pub fn basic_auth(username: String, password: String) -> Self {
        Self::BasicAuth(username, password)
    }

    /// No authentication
    pub fn none() -> Self {
        Self::None
    }

    /// Attach authentication headers to an HTTP request builder
    ///
    /// - ApiKey: `Authorization: ApiKey <key>`
    /// - BasicAuth: `Authorization: Basic <base64(username:password)>`
    /// - None: no headers
    pub fn apply_to_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        match self {
            Self::ApiKey(key) => Ok(request.header("Authorization", format!("ApiKey {}", key))),
            Self::BasicAuth(username, password) => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Ok(request.header("Authorization", format!("Basic {}", encoded)))
            }
            Self::None => Ok(request),
        }
    }

    /// Check if authentication is configured
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}
