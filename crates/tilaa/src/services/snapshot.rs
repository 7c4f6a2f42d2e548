//! Snapshot operations.

use serde::Deserialize;
use tilaa_core::envelope::{Envelope, StatusResponse};
use tilaa_core::id::SnapshotId;
use tilaa_core::{FormParams, Result};

use crate::client::TilaaClient;
use crate::models::{Snapshot, VirtualMachine};

const BASE_PATH: &str = "snapshots";

#[derive(Debug, Deserialize)]
struct SnapshotList {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBody {
    snapshot: Snapshot,
}

fn path(id: SnapshotId) -> String {
    format!("{BASE_PATH}/{id}")
}

/// Snapshot endpoints.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotService<'a> {
    client: &'a TilaaClient,
}

impl<'a> SnapshotService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// List all snapshots on the account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Vec<Snapshot>> {
        let response: Envelope<SnapshotList> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.snapshots)
    }

    /// Snapshot `machine`. Same as
    /// [`VirtualMachineService::create_snapshot`](super::VirtualMachineService::create_snapshot).
    ///
    /// # Errors
    ///
    /// Returns an error if the VM has no id, on transport failure or an
    /// `ERROR` response.
    pub async fn add(
        &self,
        machine: &VirtualMachine,
        name: &str,
        online: bool,
        overwrite: bool,
    ) -> Result<Snapshot> {
        self.client
            .virtual_machines()
            .create_snapshot(machine, name, online, overwrite)
            .await
    }

    /// Fetch a single snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn view(&self, id: SnapshotId) -> Result<Snapshot> {
        let response: Envelope<SnapshotBody> = self.client.api().get(&path(id)).await?;
        Ok(response.into_result()?.snapshot)
    }

    /// Rename `snapshot`. The local name changes only once the API accepts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`](tilaa_core::Error::NotCreated) if the
    /// snapshot has no id, otherwise an error on transport failure or an
    /// `ERROR` response.
    pub async fn rename(&self, snapshot: &mut Snapshot, name: &str) -> Result<()> {
        let id = snapshot.require_id()?;
        let payload = FormParams::new().with("name", name);
        let response: StatusResponse = self.client.api().post(&path(id), &payload).await?;
        response.into_result()?;
        snapshot.name = name.to_string();
        Ok(())
    }

    /// Delete `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`](tilaa_core::Error::NotCreated) if the
    /// snapshot has no id, otherwise an error on transport failure or an
    /// `ERROR` response.
    pub async fn delete(&self, snapshot: &Snapshot) -> Result<()> {
        let id = snapshot.require_id()?;
        let response: StatusResponse = self.client.api().delete(&path(id)).await?;
        response.into_result()?;
        Ok(())
    }

    /// Restore `snapshot` onto `machine`.
    ///
    /// # Errors
    ///
    /// Returns an error if either record has no id, on transport failure or
    /// an `ERROR` response.
    pub async fn restore(&self, machine: &VirtualMachine, snapshot: &Snapshot) -> Result<()> {
        self.client
            .virtual_machines()
            .restore_snapshot(machine, snapshot)
            .await
    }
}

impl Snapshot {
    /// Snapshot `machine` under this record's name, filling in the id when it
    /// can be resolved.
    ///
    /// # Errors
    ///
    /// As [`SnapshotService::add`].
    pub async fn create(
        &mut self,
        client: &TilaaClient,
        machine: &VirtualMachine,
        online: bool,
        overwrite: bool,
    ) -> Result<()> {
        let created = client
            .snapshots()
            .add(machine, &self.name, online, overwrite)
            .await?;
        self.id = created.id;
        Ok(())
    }

    /// Rename this snapshot.
    ///
    /// # Errors
    ///
    /// As [`SnapshotService::rename`].
    pub async fn rename(&mut self, client: &TilaaClient, name: &str) -> Result<()> {
        client.snapshots().rename(self, name).await
    }

    /// Delete this snapshot.
    ///
    /// # Errors
    ///
    /// As [`SnapshotService::delete`].
    pub async fn delete(&self, client: &TilaaClient) -> Result<()> {
        client.snapshots().delete(self).await
    }

    /// Restore this snapshot onto `machine`.
    ///
    /// # Errors
    ///
    /// As [`SnapshotService::restore`].
    pub async fn restore_to(&self, client: &TilaaClient, machine: &VirtualMachine) -> Result<()> {
        client.snapshots().restore(machine, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotStatus;
    use serde_json::json;
    use tilaa_core::id::{TemplateId, VirtualMachineId};
    use tilaa_core::{Error, ResourceKind};
    use wiremock::matchers::{body_string, method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> TilaaClient {
        TilaaClient::builder("test", "test123")
            .with_base_url(server.uri())
            .build()
            .unwrap()
    }

    fn saved(id: u64, name: &str) -> Snapshot {
        let mut snapshot = Snapshot::new(name);
        snapshot.id = Some(SnapshotId::new(id));
        snapshot
    }

    #[tokio::test]
    async fn list_and_view() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/v1/snapshots"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "snapshots": [{
                    "id": 5,
                    "name": "nightly",
                    "storage": 40,
                    "ram": 2048,
                    "template": {"id": 7, "name": "Debian 12"},
                    "status": "success",
                    "created": "2024-05-02T03:00:00Z"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/v1/snapshots/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "snapshot": {"id": 5, "name": "nightly", "status": "pending"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let snapshots = client.snapshots().list().await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].status, SnapshotStatus::Success);
        assert_eq!(
            snapshots[0].template.as_ref().map(|t| t.id),
            Some(TemplateId::new(7))
        );

        let snapshot = client.snapshots().view(SnapshotId::new(5)).await.unwrap();
        assert_eq!(snapshot.name, "nightly");
        assert_eq!(snapshot.status, SnapshotStatus::Unknown);
    }

    #[tokio::test]
    async fn view_reports_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/v1/snapshots/99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ERROR",
                "message": "Not found"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.snapshots().view(SnapshotId::new(99)).await.unwrap_err();
        assert_eq!(err, Error::Api("Not found".to_string()));
    }

    #[tokio::test]
    async fn rename_updates_name_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/v1/snapshots/5"))
            .and(body_string("name=weekly"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let mut snapshot = saved(5, "nightly");
        snapshot.rename(&client, "weekly").await.unwrap();
        assert_eq!(snapshot.name, "weekly");
    }

    #[tokio::test]
    async fn rename_keeps_name_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/v1/snapshots/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ERROR",
                "message": "Name in use"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let mut snapshot = saved(5, "nightly");
        let err = snapshot.rename(&client, "weekly").await.unwrap_err();
        assert_eq!(err, Error::Api("Name in use".to_string()));
        assert_eq!(snapshot.name, "nightly");
    }

    #[tokio::test]
    async fn delete_uses_delete_verb() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(url_path("/v1/snapshots/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        saved(5, "nightly").delete(&client).await.unwrap();
    }

    #[tokio::test]
    async fn record_operations_require_id() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let mut snapshot = Snapshot::new("nightly");
        let expected = Error::NotCreated(ResourceKind::Snapshot);

        assert_eq!(snapshot.delete(&client).await.unwrap_err(), expected);
        assert_eq!(
            snapshot.rename(&client, "weekly").await.unwrap_err(),
            expected
        );

        let mut machine = VirtualMachine::default();
        machine.id = Some(VirtualMachineId::new(12));
        assert_eq!(
            snapshot.restore_to(&client, &machine).await.unwrap_err(),
            expected
        );
    }

    #[tokio::test]
    async fn create_fills_in_resolved_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/v1/virtual_machines/12/create_snapshot"))
            .and(body_string("name=pre-upgrade&overwrite=true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/v1/snapshots"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "snapshots": [{"id": 21, "name": "pre-upgrade"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let mut machine = VirtualMachine::default();
        machine.id = Some(VirtualMachineId::new(12));

        let mut snapshot = Snapshot::new("pre-upgrade");
        snapshot
            .create(&client, &machine, false, true)
            .await
            .unwrap();
        assert_eq!(snapshot.id, Some(SnapshotId::new(21)));
    }
}
