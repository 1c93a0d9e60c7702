//! Connection configuration.
//!
//! A Quarry connection is described by a URL of the form
//! `quarry://host[:port]/database;key=value;...` plus an optional overlay
//! of key-value properties. Recognized parameter keys are `user`,
//! `password`, `apikey`, `type` (engine dialect) and `usessl`; unknown
//! keys are ignored for forward compatibility.
//!
//! Precedence, highest first: `QUARRY_API_KEY` environment variable (api
//! key only), explicit properties, URL parameters. Everything resolves
//! into one owned [`ConnectionConfig`] value — no process-global state.

use crate::auth::AuthProvider;
use crate::error::{QuarryLinkError, Result};
use crate::models::EngineType;
use std::collections::HashMap;
use url::Url;

/// URL scheme prefix for Quarry connection strings
pub const URL_PREFIX: &str = "quarry://";

const ENV_API_KEY: &str = "QUARRY_API_KEY";
const DEFAULT_DATABASE: &str = "default";

/// Resolved connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Engine hostname
    pub host: String,

    /// Engine port, when the URL carried one
    pub port: Option<u16>,

    /// Use HTTPS for all API calls
    pub use_ssl: bool,

    /// Default database for submitted queries
    pub database: String,

    /// Engine dialect for submitted queries
    pub engine: EngineType,

    /// Resolved credentials
    pub auth: AuthProvider,
}

impl ConnectionConfig {
    /// Parse a connection URL with no property overlay.
    pub fn from_url(url: &str) -> Result<Self> {
        Self::from_url_with_properties(url, &HashMap::new())
    }

    /// Parse a connection URL and apply a property overlay on top.
    ///
    /// Properties take precedence over URL parameters; the
    /// `QUARRY_API_KEY` environment variable takes precedence over both
    /// for the api key.
    pub fn from_url_with_properties(
        url: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Self> {
        if !url.starts_with(URL_PREFIX) {
            return Err(QuarryLinkError::ConfigurationError(format!(
                "invalid connection URL: {} (must start with {})",
                url, URL_PREFIX
            )));
        }

        // Split off ;key=value parameters before handing the endpoint
        // part to the URL parser.
        let (endpoint_part, params_part) = match url.split_once(';') {
            Some((head, tail)) => (head, Some(tail)),
            None => (url, None),
        };

        let parsed = Url::parse(endpoint_part).map_err(|e| {
            QuarryLinkError::ConfigurationError(format!("invalid connection URL: {}: {}", url, e))
        })?;

        let host = parsed
            .host_str()
            .ok_or_else(|| {
                QuarryLinkError::ConfigurationError(format!(
                    "missing endpoint within URL: {}",
                    url
                ))
            })?
            .to_string();
        let port = parsed.port();

        let database = {
            let path = parsed.path().trim_matches('/');
            if path.is_empty() {
                DEFAULT_DATABASE.to_string()
            } else {
                path.to_string()
            }
        };

        // Collect URL parameters, then overlay explicit properties.
        let mut settings: HashMap<String, String> = HashMap::new();
        if let Some(params) = params_part {
            for pair in params.split(';').filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once('=').ok_or_else(|| {
                    QuarryLinkError::ConfigurationError(format!(
                        "invalid parameter within URL: {}",
                        pair
                    ))
                })?;
                settings.insert(k.to_ascii_lowercase(), v.to_string());
            }
        }
        for (k, v) in properties {
            settings.insert(k.to_ascii_lowercase(), v.clone());
        }

        let use_ssl = match settings.get("usessl") {
            Some(v) => v.eq_ignore_ascii_case("true"),
            None => false,
        };

        let engine = match settings.get("type") {
            Some(v) => EngineType::parse(v).ok_or_else(|| {
                QuarryLinkError::ConfigurationError(format!(
                    "invalid engine type within URL: {}",
                    v
                ))
            })?,
            None => EngineType::default(),
        };

        let auth = Self::resolve_auth(&settings)?;

        Ok(Self {
            host,
            port,
            use_ssl,
            database,
            engine,
            auth,
        })
    }

    fn resolve_auth(settings: &HashMap<String, String>) -> Result<AuthProvider> {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                return Ok(AuthProvider::api_key(key));
            }
        }

        let user = settings.get("user").filter(|s| !s.is_empty());
        let password = settings.get("password").filter(|s| !s.is_empty());

        // A user/password pair wins over an api key from the same source,
        // matching the overlay semantics of the property precedence.
        if let (Some(user), Some(password)) = (user, password) {
            return Ok(AuthProvider::basic_auth(user.clone(), password.clone()));
        }

        if let Some(key) = settings.get("apikey").filter(|s| !s.is_empty()) {
            return Ok(AuthProvider::api_key(key.clone()));
        }

        if user.is_some() || password.is_some() {
            return Err(QuarryLinkError::ConfigurationError(
                "both user and password must be specified".to_string(),
            ));
        }

        Ok(AuthProvider::none())
    }

    /// Base URL for API calls, derived from host, port and the SSL flag.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{}://{}:{}", scheme, self.host, port),
            None => format!("{}://{}", scheme, self.host),
        }
    }
}
