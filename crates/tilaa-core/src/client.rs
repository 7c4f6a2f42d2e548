//! Authenticated HTTP transport for the Tilaa API.
//!
//! [`ApiClient`] turns `(method, path, form)` triples into basic-auth
//! requests against `{base_url}/{api_version}/{path}`, maps HTTP status codes
//! onto [`Error`] and decodes JSON bodies.

use crate::config::{Credentials, TilaaClientConfig};
use crate::error::{Error, Result};
use crate::form::FormParams;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("tilaa-rs/", env!("CARGO_PKG_VERSION"));

/// Media type requested from the API.
pub const ACCEPT: &str = "application/json";

/// Builder for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    config: TilaaClientConfig,
    credentials: Credentials,
}

impl ApiClientBuilder {
    /// Create a builder from a configuration and credentials.
    #[must_use]
    pub fn new(config: TilaaClientConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// Replace the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Finalise the builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self.config.parse_base_url()?;
        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());

        let mut builder = ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(self.config.timeout())
            .connect_timeout(Duration::from_secs(10));

        if !self.config.tls_verify {
            warn!("TLS verification disabled for Tilaa client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(ApiClient {
            http,
            base_url,
            api_version: self.config.api_version,
            credentials: self.credentials,
        })
    }
}

/// Basic-auth JSON transport shared by every resource service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    api_version: String,
    credentials: Credentials,
}

impl ApiClient {
    /// Construct a transport against the production API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        ApiClientBuilder::new(
            TilaaClientConfig::default(),
            Credentials::new(username, password),
        )
        .build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the API version path segment.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Return the credentials in use.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Replace the basic-auth credentials used for subsequent requests.
    pub fn set_basic_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials = Credentials::new(username, password);
    }

    /// Resolve a resource path against the versioned base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the path cannot be joined.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        let relative = format!("{}/{}", self.api_version, path.trim_start_matches('/'));
        self.base_url
            .join(&relative)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }

    /// Issue a GET request and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or decode failure.
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::GET, path, None).await
    }

    /// Issue a form-encoded POST request and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or decode failure.
    pub async fn post<T>(&self, path: &str, form: &FormParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(form)).await
    }

    /// Issue a DELETE request and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or decode failure.
    pub async fn delete<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::DELETE, path, None).await
    }

    async fn send<T>(&self, method: Method, path: &str, form: Option<&FormParams>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(path)?;

        debug!(%method, path = %path, "Sending Tilaa API request");

        let mut request = self
            .http
            .request(method, url)
            .header("Accept", ACCEPT)
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.password()),
            );

        if let Some(form) = form {
            // `.form` sets `Content-Type: application/x-www-form-urlencoded`.
            request = request.form(form.pairs());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidCredentials {
                username: self.credentials.username().to_string(),
            });
        }

        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_to_error(status, &text));
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|err| {
            Error::Decode(format!("Failed to parse Tilaa response for `{path}`: {err}"))
        })
    }
}

fn map_status_to_error(status: StatusCode, text: &str) -> Error {
    let reason = if text.is_empty() {
        format!("[{status}] Request returned with non-200 status")
    } else {
        format!("[{status}] Request returned with non-200 status: {text}")
    };

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(reason),
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => Error::ServiceUnavailable(reason),
        status if status.is_server_error() => Error::ServiceUnavailable(reason),
        _ => Error::RequestFailed(reason),
    }
}
