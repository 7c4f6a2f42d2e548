//! SSH key operations.

use serde::Deserialize;
use tilaa_core::envelope::{Envelope, StatusResponse};
use tilaa_core::id::SshKeyId;
use tilaa_core::Result;
use tracing::{debug, warn};
use validator::Validate;

use crate::client::TilaaClient;
use crate::models::SshKey;

const BASE_PATH: &str = "ssh_keys";

#[derive(Debug, Deserialize)]
struct SshKeyList {
    #[serde(default)]
    ssh_keys: Vec<SshKey>,
}

#[derive(Debug, Deserialize)]
struct SshKeyBody {
    ssh_key: SshKey,
}

fn path(id: SshKeyId) -> String {
    format!("{BASE_PATH}/{id}")
}

/// SSH key endpoints.
#[derive(Debug, Clone, Copy)]
pub struct SshKeyService<'a> {
    client: &'a TilaaClient,
}

impl<'a> SshKeyService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// List all SSH keys.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Vec<SshKey>> {
        let response: Envelope<SshKeyList> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.ssh_keys)
    }

    /// Upload `key`.
    ///
    /// The endpoint does not return the new id; it is looked up in the key
    /// list by label and key material afterwards and left unset when the
    /// lookup finds nothing or fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](tilaa_core::Error::Validation) if the
    /// record is invalid, otherwise an error on transport failure or an
    /// `ERROR` response.
    pub async fn add(&self, key: &mut SshKey) -> Result<()> {
        key.validate()?;
        let response: StatusResponse = self.client.api().post(BASE_PATH, &key.payload()).await?;
        response.into_result()?;

        match self.list().await {
            Ok(keys) => {
                let resolved = keys
                    .iter()
                    .filter(|candidate| candidate.same_key(key))
                    .filter_map(|candidate| candidate.id)
                    .max();
                key.id = resolved;
                debug!(id = ?key.id, label = %key.label, "Created SSH key");
            }
            Err(err) => {
                warn!(label = %key.label, error = %err, "Unable to resolve new SSH key id");
            }
        }
        Ok(())
    }

    /// Fetch a single key.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn view(&self, id: SshKeyId) -> Result<SshKey> {
        let response: Envelope<SshKeyBody> = self.client.api().get(&path(id)).await?;
        Ok(response.into_result()?.ssh_key)
    }

    /// Overwrite the remote key with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`](tilaa_core::Error::NotCreated) if the key
    /// has no id, otherwise as [`SshKeyService::add`].
    pub async fn edit(&self, key: &SshKey) -> Result<()> {
        let id = key.require_id()?;
        key.validate()?;
        let response: StatusResponse = self.client.api().post(&path(id), &key.payload()).await?;
        response.into_result()?;
        Ok(())
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`](tilaa_core::Error::NotCreated) if the key
    /// has no id, otherwise an error on transport failure or an `ERROR`
    /// response.
    pub async fn delete(&self, key: &SshKey) -> Result<()> {
        let id = key.require_id()?;
        let response: StatusResponse = self.client.api().delete(&path(id)).await?;
        response.into_result()?;
        Ok(())
    }
}

impl SshKey {
    /// Upload this key.
    ///
    /// # Errors
    ///
    /// As [`SshKeyService::add`].
    pub async fn create(&mut self, client: &TilaaClient) -> Result<()> {
        client.ssh_keys().add(self).await
    }

    /// Save local changes.
    ///
    /// # Errors
    ///
    /// As [`SshKeyService::edit`].
    pub async fn commit(&self, client: &TilaaClient) -> Result<()> {
        client.ssh_keys().edit(self).await
    }

    /// Delete this key.
    ///
    /// # Errors
    ///
    /// As [`SshKeyService::delete`].
    pub async fn delete(&self, client: &TilaaClient) -> Result<()> {
        client.ssh_keys().delete(self).await
    }
}
