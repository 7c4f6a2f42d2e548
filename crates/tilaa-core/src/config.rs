//! Configuration structures for Tilaa clients.
//!
//! This module provides the endpoint configuration and the static basic-auth
//! credentials used to reach the Tilaa API.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.tilaa.com";

/// API version prefixed to every request path.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a Tilaa client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TilaaClientConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version path segment
    #[validate(length(min = 1))]
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional `User-Agent` override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl TilaaClientConfig {
    /// Create a configuration pointing at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the API version path segment.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the base URL, normalised to end with `/` so that relative paths
    /// are appended rather than replacing the last segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL: {e}")))?;

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

impl Default for TilaaClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}

/// Static HTTP basic-auth credentials.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Create credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = TilaaClientConfig::new("https://api.example.com").unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.api_version, "v1");
        assert!(config.tls_verify);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_config_invalid_url() {
        let result = TilaaClientConfig::new("not-a-url");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_default() {
        let config = TilaaClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = TilaaClientConfig::new("https://api.example.com")
            .unwrap()
            .with_api_version("v2")
            .with_tls_verify(false)
            .with_timeout(60)
            .with_user_agent("my-tool/1.0");

        assert_eq!(config.api_version, "v2");
        assert!(!config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.user_agent.as_deref(), Some("my-tool/1.0"));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let config = TilaaClientConfig::new("https://api.example.com/proxy").unwrap();
        let url = config.parse_base_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/proxy/");

        let config = TilaaClientConfig::new("https://api.example.com").unwrap();
        let url = config.parse_base_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/");
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = TilaaClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_applies_defaults() {
        let config: TilaaClientConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:8080"}"#).unwrap();
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.tls_verify);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("test", "test123");
        assert_eq!(credentials.username(), "test");
        assert_eq!(credentials.password(), "test123");

        let debug = format!("{credentials:?}");
        assert!(debug.contains("test"));
        assert!(!debug.contains("test123"));
    }
}
