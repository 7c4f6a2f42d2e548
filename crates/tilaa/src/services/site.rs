//! Site listing.

use serde::Deserialize;
use tilaa_core::envelope::Envelope;
use tilaa_core::Result;

use crate::client::TilaaClient;
use crate::models::Site;

const BASE_PATH: &str = "sites";

#[derive(Debug, Deserialize)]
struct SiteList {
    #[serde(default)]
    sites: Vec<Site>,
}

/// Site endpoints.
#[derive(Debug, Clone, Copy)]
pub struct SiteService<'a> {
    client: &'a TilaaClient,
}

impl<'a> SiteService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// List the data centre sites VMs can be placed in.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Vec<Site>> {
        let response: Envelope<SiteList> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.sites)
    }
}
