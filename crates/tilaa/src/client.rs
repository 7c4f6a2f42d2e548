//! Top-level Tilaa client.

use crate::services::{
    MetadataService, PresetService, SiteService, SnapshotService, SshKeyService,
    TemplateService, VirtualMachineService,
};
use crate::Result;
use tilaa_core::{ApiClient, ApiClientBuilder, Credentials, TilaaClientConfig};
use url::Url;

/// Builder for [`TilaaClient`].
#[derive(Debug, Clone)]
pub struct TilaaClientBuilder {
    config: TilaaClientConfig,
    credentials: Credentials,
}

impl TilaaClientBuilder {
    /// Create a builder for the production API with the given credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            config: TilaaClientConfig::default(),
            credentials: Credentials::new(username, password),
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: TilaaClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Point the client at another endpoint, e.g. a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Override the request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config = self.config.with_timeout(seconds);
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub fn with_tls_verify(mut self, verify: bool) -> Self {
        self.config = self.config.with_tls_verify(verify);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(user_agent);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<TilaaClient> {
        let inner = ApiClientBuilder::new(self.config, self.credentials).build()?;
        Ok(TilaaClient { inner })
    }
}

/// Asynchronous Tilaa API client.
///
/// Resource operations are grouped per service:
///
/// ```no_run
/// # async fn run() -> tilaa::Result<()> {
/// let client = tilaa::TilaaClient::new("user@example.com", "secret")?;
/// for machine in client.virtual_machines().list().await? {
///     println!("{} is {:?}", machine.name, machine.status);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TilaaClient {
    inner: ApiClient,
}

impl TilaaClient {
    /// Construct a client for the production API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        TilaaClientBuilder::new(username, password).build()
    }

    /// Start a builder.
    #[must_use]
    pub fn builder(username: impl Into<String>, password: impl Into<String>) -> TilaaClientBuilder {
        TilaaClientBuilder::new(username, password)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Replace the basic-auth credentials used for subsequent requests.
    pub fn set_basic_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.inner.set_basic_auth(username, password);
    }

    /// Access the underlying transport.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner
    }

    /// Virtual machine operations.
    #[must_use]
    pub fn virtual_machines(&self) -> VirtualMachineService<'_> {
        VirtualMachineService::new(self)
    }

    /// Snapshot operations.
    #[must_use]
    pub fn snapshots(&self) -> SnapshotService<'_> {
        SnapshotService::new(self)
    }

    /// Template listing.
    #[must_use]
    pub fn templates(&self) -> TemplateService<'_> {
        TemplateService::new(self)
    }

    /// Preset listing.
    #[must_use]
    pub fn presets(&self) -> PresetService<'_> {
        PresetService::new(self)
    }

    /// Site listing.
    #[must_use]
    pub fn sites(&self) -> SiteService<'_> {
        SiteService::new(self)
    }

    /// Metadata operations.
    #[must_use]
    pub fn metadata(&self) -> MetadataService<'_> {
        MetadataService::new(self)
    }

    /// SSH key operations.
    #[must_use]
    pub fn ssh_keys(&self) -> SshKeyService<'_> {
        SshKeyService::new(self)
    }
}
