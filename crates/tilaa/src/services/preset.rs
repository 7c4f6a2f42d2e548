//! Preset listing.

use serde::Deserialize;
use tilaa_core::envelope::Envelope;
use tilaa_core::Result;

use crate::client::TilaaClient;
use crate::models::Presets;

const BASE_PATH: &str = "presets";

#[derive(Debug, Deserialize)]
struct PresetsBody {
    #[serde(default)]
    presets: Presets,
}

/// Preset endpoints.
#[derive(Debug, Clone, Copy)]
pub struct PresetService<'a> {
    client: &'a TilaaClient,
}

impl<'a> PresetService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// Fetch the RAM and storage sizes on offer.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Presets> {
        let response: Envelope<PresetsBody> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.presets)
    }
}
