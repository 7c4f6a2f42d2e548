//! Metadata operations.

use serde::Deserialize;
use tilaa_core::envelope::{Created, Envelope, StatusResponse};
use tilaa_core::id::MetadataId;
use tilaa_core::Result;
use tracing::debug;
use validator::Validate;

use crate::client::TilaaClient;
use crate::models::Metadata;

const BASE_PATH: &str = "metadata";

#[derive(Debug, Deserialize)]
struct MetadataList {
    #[serde(default)]
    metadata: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
struct MetadataBody {
    metadata: Metadata,
}

fn path(id: MetadataId) -> String {
    format!("{BASE_PATH}/{id}")
}

/// Metadata endpoints.
#[derive(Debug, Clone, Copy)]
pub struct MetadataService<'a> {
    client: &'a TilaaClient,
}

impl<'a> MetadataService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// List all metadata records.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Vec<Metadata>> {
        let response: Envelope<MetadataList> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.metadata)
    }

    /// Create `metadata` and store the assigned id on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](tilaa_core::Error::Validation) if the
    /// record is invalid, otherwise an error on transport failure or an
    /// `ERROR` response.
    pub async fn add(&self, metadata: &mut Metadata) -> Result<()> {
        metadata.validate()?;
        let response: Envelope<Created<MetadataId>> = self
            .client
            .api()
            .post(BASE_PATH, &metadata.payload())
            .await?;
        metadata.id = response.into_result()?.id;
        debug!(id = ?metadata.id, name = %metadata.name, "Created metadata");
        Ok(())
    }

    /// Fetch a single record.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn view(&self, id: MetadataId) -> Result<Metadata> {
        let response: Envelope<MetadataBody> = self.client.api().get(&path(id)).await?;
        Ok(response.into_result()?.metadata)
    }

    /// Overwrite the remote record with `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`](tilaa_core::Error::NotCreated) if the
    /// record has no id, otherwise as [`MetadataService::add`].
    pub async fn edit(&self, metadata: &Metadata) -> Result<()> {
        let id = metadata.require_id()?;
        metadata.validate()?;
        let response: StatusResponse = self
            .client
            .api()
            .post(&path(id), &metadata.payload())
            .await?;
        response.into_result()?;
        Ok(())
    }

    /// Delete `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`](tilaa_core::Error::NotCreated) if the
    /// record has no id, otherwise an error on transport failure or an
    /// `ERROR` response.
    pub async fn delete(&self, metadata: &Metadata) -> Result<()> {
        let id = metadata.require_id()?;
        let response: StatusResponse = self.client.api().delete(&path(id)).await?;
        response.into_result()?;
        Ok(())
    }
}

impl Metadata {
    /// Create this record.
    ///
    /// # Errors
    ///
    /// As [`MetadataService::add`].
    pub async fn create(&mut self, client: &TilaaClient) -> Result<()> {
        client.metadata().add(self).await
    }

    /// Save local changes.
    ///
    /// # Errors
    ///
    /// As [`MetadataService::edit`].
    pub async fn commit(&self, client: &TilaaClient) -> Result<()> {
        client.metadata().edit(self).await
    }

    /// Delete this record.
    ///
    /// # Errors
    ///
    /// As [`MetadataService::delete`].
    pub async fn delete(&self, client: &TilaaClient) -> Result<()> {
        client.metadata().delete(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tilaa_core::{Error, ResourceKind};
    use wiremock::matchers::{body_string_contains, method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> TilaaClient {
        TilaaClient::builder("test", "test123")
            .with_base_url(server.uri())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn create_stores_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/v1/metadata"))
            .and(body_string_contains("name=web"))
            .and(body_string_contains("user_data=%23cloud-config"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "id": 31})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let mut metadata = Metadata::new("web", "#cloud-config\n");
        metadata.create(&client).await.unwrap();
        assert_eq!(metadata.id, Some(MetadataId::new(31)));
    }

    #[tokio::test]
    async fn list_view_edit_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/v1/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "metadata": [{
                    "id": 31,
                    "name": "web",
                    "user_data": "#cloud-config\n",
                    "created": "2024-01-10T09:00:00Z",
                    "modified": "2024-01-11T09:00:00Z"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/v1/metadata/31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "metadata": {"id": 31, "name": "web", "user_data": ""}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/v1/metadata/31"))
            .and(body_string_contains("name=db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(url_path("/v1/metadata/31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let records = client.metadata().list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].modified > records[0].created);

        let mut metadata = client.metadata().view(MetadataId::new(31)).await.unwrap();
        metadata.name = "db".to_string();
        metadata.commit(&client).await.unwrap();
        metadata.delete(&client).await.unwrap();
    }

    #[tokio::test]
    async fn view_reports_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/v1/metadata/99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ERROR",
                "message": "Not found"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.metadata().view(MetadataId::new(99)).await.unwrap_err();
        assert_eq!(err, Error::Api("Not found".to_string()));
    }

    #[tokio::test]
    async fn record_operations_require_id() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let metadata = Metadata::new("web", "");
        let expected = Error::NotCreated(ResourceKind::Metadata);
        assert_eq!(metadata.commit(&client).await.unwrap_err(), expected);
        assert_eq!(metadata.delete(&client).await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn invalid_record_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let mut metadata = Metadata::new("", "data");
        assert!(matches!(
            metadata.create(&client).await,
            Err(Error::Validation(_))
        ));
    }
}
