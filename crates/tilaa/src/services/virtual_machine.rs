//! Virtual machine operations.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tilaa_core::envelope::{Created, Envelope, StatusResponse};
use tilaa_core::id::VirtualMachineId;
use tilaa_core::{Error, FormParams, Result};
use tracing::{debug, warn};
use validator::Validate;

use crate::client::TilaaClient;
use crate::models::{Snapshot, Task, VirtualMachine};

const BASE_PATH: &str = "virtual_machines";

#[derive(Debug, Deserialize)]
struct VirtualMachineList {
    #[serde(default)]
    virtual_machines: Vec<VirtualMachine>,
}

#[derive(Debug, Deserialize)]
struct VirtualMachineBody {
    virtual_machine: VirtualMachine,
}

#[derive(Debug, Deserialize)]
struct CancelDates {
    #[serde(default)]
    dates: Vec<DateTime<FixedOffset>>,
}

fn path(id: VirtualMachineId) -> String {
    format!("{BASE_PATH}/{id}")
}

/// Virtual machine endpoints.
#[derive(Debug, Clone, Copy)]
pub struct VirtualMachineService<'a> {
    client: &'a TilaaClient,
}

impl<'a> VirtualMachineService<'a> {
    pub(crate) fn new(client: &'a TilaaClient) -> Self {
        Self { client }
    }

    /// List all virtual machines on the account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn list(&self) -> Result<Vec<VirtualMachine>> {
        let response: Envelope<VirtualMachineList> = self.client.api().get(BASE_PATH).await?;
        Ok(response.into_result()?.virtual_machines)
    }

    /// Create `machine` and store the assigned id on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the record is incomplete, otherwise an
    /// error on transport failure or an `ERROR` response.
    pub async fn add(&self, machine: &mut VirtualMachine) -> Result<()> {
        machine.validate_for_create()?;
        let payload = machine.payload();
        self.create(machine, payload).await
    }

    /// Create `machine` from the contents of `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the snapshot has no id, otherwise as
    /// [`VirtualMachineService::add`].
    pub async fn add_from_snapshot(
        &self,
        machine: &mut VirtualMachine,
        snapshot: &Snapshot,
    ) -> Result<()> {
        machine.validate_for_create()?;
        let snapshot_id = snapshot.require_id()?;
        let mut payload = machine.payload();
        payload.push("snapshot", snapshot_id);
        self.create(machine, payload).await
    }

    async fn create(&self, machine: &mut VirtualMachine, payload: FormParams) -> Result<()> {
        let response: Envelope<Created<VirtualMachineId>> =
            self.client.api().post(BASE_PATH, &payload).await?;
        let created = response.into_result()?;
        machine.id = created.id;
        if machine.id.is_none() {
            warn!(name = %machine.name, "Virtual machine created but no id was returned");
        } else {
            debug!(id = ?machine.id, name = %machine.name, "Created virtual machine");
        }
        Ok(())
    }

    /// Fetch a single virtual machine.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an `ERROR` response.
    pub async fn view(&self, id: VirtualMachineId) -> Result<VirtualMachine> {
        let response: Envelope<VirtualMachineBody> = self.client.api().get(&path(id)).await?;
        Ok(response.into_result()?.virtual_machine)
    }

    /// Send the pending changes of `machine`.
    ///
    /// Nothing is sent when there are no pending changes. Change tracking is
    /// reset once the API accepts the edit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id,
    /// [`Error::Validation`] if the record is invalid, otherwise an error on
    /// transport failure or an `ERROR` response.
    pub async fn edit(&self, machine: &mut VirtualMachine) -> Result<()> {
        let id = machine.require_id()?;
        machine.validate()?;

        let payload = machine.pending_changes();
        if payload.is_empty() {
            debug!(%id, "No pending virtual machine changes");
            return Ok(());
        }

        let response: StatusResponse = self.client.api().post(&path(id), &payload).await?;
        response.into_result()?;
        machine.clear_changes();
        Ok(())
    }

    /// Schedule cancellation of `machine` on `date`.
    ///
    /// The cancellation is recorded on `machine` as midnight UTC of `date`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id, otherwise an error
    /// on transport failure or an `ERROR` response.
    pub async fn cancel(&self, machine: &mut VirtualMachine, date: NaiveDate) -> Result<()> {
        self.schedule_cancellation(machine, date, date.and_time(NaiveTime::MIN).and_utc())
            .await
    }

    async fn schedule_cancellation(
        &self,
        machine: &mut VirtualMachine,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let id = machine.require_id()?;
        let payload = FormParams::new().with("date", date.format("%Y-%m-%d"));
        let response: StatusResponse = self
            .client
            .api()
            .post(&format!("{}/cancel", path(id)), &payload)
            .await?;
        response.into_result()?;
        machine.cancelled = Some(at);
        Ok(())
    }

    /// Withdraw a scheduled cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id, otherwise an error
    /// on transport failure or an `ERROR` response.
    pub async fn undo_cancellation(&self, machine: &VirtualMachine) -> Result<()> {
        let id = machine.require_id()?;
        let payload = FormParams::new().with("date", 0);
        let response: StatusResponse = self
            .client
            .api()
            .post(&format!("{}/cancel", path(id)), &payload)
            .await?;
        response.into_result()?;
        Ok(())
    }

    /// Dates on which `machine` may be cancelled, with the offset the API
    /// reported them in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id, otherwise an error
    /// on transport failure or an `ERROR` response.
    pub async fn cancel_dates(
        &self,
        machine: &VirtualMachine,
    ) -> Result<Vec<DateTime<FixedOffset>>> {
        let id = machine.require_id()?;
        let response: Envelope<CancelDates> = self
            .client
            .api()
            .get(&format!("{}/cancel", path(id)))
            .await?;
        Ok(response.into_result()?.dates)
    }

    /// Run a power or rescue task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id, otherwise an error
    /// on transport failure or an `ERROR` response.
    pub async fn run_task(&self, task: Task, machine: &VirtualMachine) -> Result<()> {
        let id = machine.require_id()?;
        debug!(%id, %task, "Running virtual machine task");
        let response: StatusResponse = self
            .client
            .api()
            .get(&format!("{}/{task}", path(id)))
            .await?;
        response.into_result()?;
        Ok(())
    }

    /// Reinstall `machine` from its template. All data on the VM is lost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id,
    /// [`Error::Validation`] if it has no template, otherwise an error on
    /// transport failure or an `ERROR` response.
    pub async fn reinstall(&self, machine: &VirtualMachine) -> Result<()> {
        let id = machine.require_id()?;
        let template = machine
            .template
            .as_ref()
            .ok_or_else(|| Error::Validation("template must be set".to_string()))?;

        let mut payload = FormParams::new().with("template", template.id);
        payload.push_flag("reinstall", true);
        payload.push_flag("confirm_reinstall", true);

        let response: StatusResponse = self.client.api().post(&path(id), &payload).await?;
        response.into_result()?;
        Ok(())
    }

    /// Snapshot `machine` under `name`.
    ///
    /// The endpoint does not return the new id, so it is looked up in the
    /// snapshot list afterwards. The returned snapshot has no id when the
    /// lookup finds nothing or fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id, otherwise an error
    /// on transport failure or an `ERROR` response.
    pub async fn create_snapshot(
        &self,
        machine: &VirtualMachine,
        name: &str,
        online: bool,
        overwrite: bool,
    ) -> Result<Snapshot> {
        let id = machine.require_id()?;

        let mut payload = FormParams::new().with("name", name);
        payload.push_flag("online", online);
        payload.push_flag("overwrite", overwrite);

        let response: StatusResponse = self
            .client
            .api()
            .post(&format!("{}/create_snapshot", path(id)), &payload)
            .await?;
        response.into_result()?;

        let mut snapshot = Snapshot::new(name);
        match self.client.snapshots().list().await {
            Ok(snapshots) => {
                snapshot.id = snapshots
                    .iter()
                    .filter(|candidate| candidate.name == name)
                    .filter_map(|candidate| candidate.id)
                    .max();
            }
            Err(err) => {
                warn!(%id, name, error = %err, "Unable to resolve new snapshot id");
            }
        }
        Ok(snapshot)
    }

    /// Restore `snapshot` onto `machine`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if either record has no id, otherwise an
    /// error on transport failure or an `ERROR` response.
    pub async fn restore_snapshot(
        &self,
        machine: &VirtualMachine,
        snapshot: &Snapshot,
    ) -> Result<()> {
        let id = machine.require_id()?;
        let payload = FormParams::new().with("snapshot", snapshot.require_id()?);
        let response: StatusResponse = self
            .client
            .api()
            .post(&format!("{}/restore_snapshot", path(id)), &payload)
            .await?;
        response.into_result()?;
        Ok(())
    }
}

impl VirtualMachine {
    /// Create this VM. See [`VirtualMachineService::add`].
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::add`].
    pub async fn create(&mut self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().add(self).await
    }

    /// Create this VM from `snapshot`.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::add_from_snapshot`].
    pub async fn create_from_snapshot(
        &mut self,
        client: &TilaaClient,
        snapshot: &Snapshot,
    ) -> Result<()> {
        client.virtual_machines().add_from_snapshot(self, snapshot).await
    }

    /// Send pending changes. See [`VirtualMachineService::edit`].
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::edit`].
    pub async fn commit(&mut self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().edit(self).await
    }

    /// Cancel on `date`, which must be one of the offered cancel dates.
    ///
    /// Offered dates are matched by their calendar day in the offset the API
    /// reported. On success `cancelled` holds the offered instant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCancelDate`] when `date` is not offered,
    /// otherwise as [`VirtualMachineService::cancel`].
    pub async fn cancel(&mut self, client: &TilaaClient, date: NaiveDate) -> Result<()> {
        self.require_id()?;
        let service = client.virtual_machines();
        let offered = service
            .cancel_dates(self)
            .await?
            .into_iter()
            .find(|candidate| candidate.date_naive() == date)
            .ok_or_else(|| Error::InvalidCancelDate(date.to_string()))?;
        service
            .schedule_cancellation(self, date, offered.with_timezone(&Utc))
            .await
    }

    /// Withdraw a cancellation scheduled in the future.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCancelled`] unless a future cancellation is
    /// recorded, otherwise as [`VirtualMachineService::undo_cancellation`].
    pub async fn undo_cancellation(&mut self, client: &TilaaClient) -> Result<()> {
        self.require_id()?;
        match self.cancelled {
            Some(cancelled) if cancelled > Utc::now() => {}
            _ => return Err(Error::NotCancelled),
        }
        client.virtual_machines().undo_cancellation(self).await?;
        self.cancelled = None;
        Ok(())
    }

    /// Dates on which this VM may be cancelled.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::cancel_dates`].
    pub async fn cancel_dates(&self, client: &TilaaClient) -> Result<Vec<DateTime<FixedOffset>>> {
        client.virtual_machines().cancel_dates(self).await
    }

    /// Boot the VM.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::run_task`].
    pub async fn start(&self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().run_task(Task::Start, self).await
    }

    /// Shut the VM down gracefully.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::run_task`].
    pub async fn stop(&self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().run_task(Task::Stop, self).await
    }

    /// Reboot the VM.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::run_task`].
    pub async fn restart(&self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().run_task(Task::Restart, self).await
    }

    /// Cut power to the VM.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::run_task`].
    pub async fn power_off(&self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().run_task(Task::PowerOff, self).await
    }

    /// Boot the VM into rescue mode.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::run_task`].
    pub async fn rescue(&self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().run_task(Task::Rescue, self).await
    }

    /// Reinstall from the current template.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::reinstall`].
    pub async fn reinstall(&self, client: &TilaaClient) -> Result<()> {
        client.virtual_machines().reinstall(self).await
    }

    /// Snapshot this VM.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::create_snapshot`].
    pub async fn create_snapshot(
        &self,
        client: &TilaaClient,
        name: &str,
        online: bool,
        overwrite: bool,
    ) -> Result<Snapshot> {
        client
            .virtual_machines()
            .create_snapshot(self, name, online, overwrite)
            .await
    }

    /// Restore `snapshot` onto this VM.
    ///
    /// # Errors
    ///
    /// As [`VirtualMachineService::restore_snapshot`].
    pub async fn restore_snapshot(&self, client: &TilaaClient, snapshot: &Snapshot) -> Result<()> {
        client
            .virtual_machines()
            .restore_snapshot(self, snapshot)
            .await
    }

    /// Replace every field with the current remote state. Pending changes are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id, otherwise as
    /// [`VirtualMachineService::view`].
    pub async fn refresh(&mut self, client: &TilaaClient) -> Result<()> {
        let id = self.require_id()?;
        *self = client.virtual_machines().view(id).await?;
        Ok(())
    }
}
