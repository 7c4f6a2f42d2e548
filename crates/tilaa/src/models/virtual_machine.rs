//! Virtual machine records and edit tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tilaa_core::id::{NetworkId, SiteId, TemplateId, VirtualMachineId};
use tilaa_core::{Error, FormParams, ResourceKind, Result};
use validator::Validate;

use super::site::Site;
use super::template::Template;

/// CPU allocation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Cpu {
    /// Number of cores.
    #[serde(rename = "count", default)]
    #[validate(range(min = 1))]
    pub cores: u32,
    /// CPU cap in percent.
    #[serde(default)]
    pub cap: u32,
}

/// Disk technology backing the VM storage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Spinning disk.
    Hdd,
    /// Solid state disk.
    #[default]
    Ssd,
}

impl StorageType {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hdd => "hdd",
            Self::Ssd => "ssd",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage allocation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Storage {
    /// Size in GB.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub size: u64,
    /// Disk technology.
    #[serde(rename = "type", default)]
    pub kind: StorageType,
}

/// IP protocol family of a network interface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum NetworkFamily {
    /// IPv4.
    #[default]
    Ipv4,
    /// IPv6.
    Ipv6,
}

impl TryFrom<u8> for NetworkFamily {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Ipv4),
            6 => Ok(Self::Ipv6),
            other => Err(format!("unknown network family {other}")),
        }
    }
}

impl From<NetworkFamily> for u8 {
    fn from(family: NetworkFamily) -> Self {
        match family {
            NetworkFamily::Ipv4 => 4,
            NetworkFamily::Ipv6 => 6,
        }
    }
}

/// A network interface address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Interface id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NetworkId>,
    /// Address family.
    #[serde(default)]
    pub family: NetworkFamily,
    /// Assigned address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,
    /// Reverse DNS name.
    #[serde(default)]
    pub dns_name: String,
}

/// Initial administrator account of the installed OS.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Admin {
    /// Account name.
    #[serde(default)]
    pub account: String,
    /// Password generated at install time.
    #[serde(default)]
    pub initial_password: String,
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin")
            .field("account", &self.account)
            .field("initial_password", &"[REDACTED]")
            .finish()
    }
}

/// Lifecycle state reported by the API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VirtualMachineStatus {
    /// Queued for creation.
    Pending,
    /// Creation failed.
    CreateFailed,
    /// Destroyed.
    Destroyed,
    /// Being created.
    Creating,
    /// Powered off.
    Stopped,
    /// Booting.
    Starting,
    /// Rebooting.
    Restarting,
    /// Up and running.
    Running,
    /// Running from the rescue image.
    RunningRescue,
    /// Shutting down.
    Stopping,
    /// Resize failed.
    ResizeFailed,
    /// Being destroyed.
    Destroying,
    /// Destroy failed.
    DestroyFailed,
    /// Being resized.
    Resizing,
    /// Being migrated offline.
    Migrating,
    /// Being migrated live.
    LiveMigrating,
    /// Migration failed.
    MigrateFailed,
    /// Paused.
    Paused,
    /// Snapshot in progress.
    CreatingSnapshot,
    /// Snapshot restore in progress.
    RestoringSnapshot,
    /// Snapshot restore failed.
    RestoreSnapshotFailed,
    /// Any state this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl VirtualMachineStatus {
    /// Returns true for the `*_failed` states.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed
                | Self::ResizeFailed
                | Self::DestroyFailed
                | Self::MigrateFailed
                | Self::RestoreSnapshotFailed
        )
    }

    /// Returns true while the VM is running, normally or in rescue mode.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::RunningRescue)
    }
}

/// Power and maintenance tasks that can be run against a VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Boot the VM.
    Start,
    /// Graceful shutdown.
    Stop,
    /// Graceful reboot.
    Restart,
    /// Hard power off.
    PowerOff,
    /// Boot into the rescue image.
    Rescue,
}

impl Task {
    /// Returns the path segment of the task endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::PowerOff => "poweroff",
            Self::Rescue => "rescue",
        }
    }

    /// Returns every task.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Start,
            Self::Stop,
            Self::Restart,
            Self::PowerOff,
            Self::Rescue,
        ]
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| Error::InvalidTask(s.to_string()))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values captured before the first local edit of each tracked field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Original {
    name: Option<String>,
    ram: Option<u64>,
    storage: Option<u64>,
    cpu_cores: Option<u32>,
    cpu_cap: Option<u32>,
}

/// A virtual machine as returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct VirtualMachine {
    /// VM id; unset until the VM has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VirtualMachineId>,
    /// Hostname-like name.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    /// CPU allocation.
    #[serde(default)]
    #[validate(nested)]
    pub cpu: Cpu,
    /// RAM in MB.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub ram: u64,
    /// Storage allocation.
    #[serde(default)]
    #[validate(nested)]
    pub storage: Storage,
    /// Placement site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,
    /// Installed template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    /// Network interfaces.
    #[serde(default)]
    pub network: Vec<Network>,
    /// Initial administrator account.
    #[serde(default)]
    pub admin: Admin,
    /// Whether the VM is managed by Tilaa.
    #[serde(rename = "is_managed", default)]
    pub managed: bool,
    /// Whether the VM is locked against changes.
    #[serde(default)]
    pub locked: bool,
    /// Lifecycle state.
    #[serde(default)]
    pub status: VirtualMachineStatus,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Scheduled cancellation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<DateTime<Utc>>,

    #[serde(skip)]
    original: Original,
}

impl VirtualMachine {
    /// Start describing a VM to create.
    #[must_use]
    pub fn new(name: impl Into<String>, site: SiteId, template: TemplateId) -> Self {
        Self {
            name: name.into(),
            site: Some(Site::from_id(site)),
            template: Some(Template::from_id(template)),
            ..Self::default()
        }
    }

    /// Set RAM in MB.
    #[must_use]
    pub fn with_ram(mut self, ram: u64) -> Self {
        self.ram = ram;
        self
    }

    /// Set core count and CPU cap.
    #[must_use]
    pub fn with_cpu(mut self, cores: u32, cap: u32) -> Self {
        self.cpu = Cpu { cores, cap };
        self
    }

    /// Set storage size in GB and disk technology.
    #[must_use]
    pub fn with_storage(mut self, size: u64, kind: StorageType) -> Self {
        self.storage = Storage { size, kind };
        self
    }

    /// Set the reverse DNS name of the primary interface.
    #[must_use]
    pub fn with_dns_name(mut self, dns_name: impl Into<String>) -> Self {
        let dns_name = dns_name.into();
        match self.network.first_mut() {
            Some(primary) => primary.dns_name = dns_name,
            None => self.network.push(Network {
                dns_name,
                ..Network::default()
            }),
        }
        self
    }

    /// Returns the id, or [`Error::NotCreated`] when the VM does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if no id has been assigned.
    pub fn require_id(&self) -> Result<VirtualMachineId> {
        self.id
            .ok_or(Error::NotCreated(ResourceKind::VirtualMachine))
    }

    /// Validates the record for creation: field constraints plus a site and a
    /// template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first problem found.
    pub fn validate_for_create(&self) -> Result<()> {
        self.validate()?;

        if self.site.is_none() {
            return Err(Error::Validation("site must be set".to_string()));
        }
        if self.template.is_none() {
            return Err(Error::Validation("template must be set".to_string()));
        }

        Ok(())
    }

    /// Form body used when creating the VM.
    #[must_use]
    pub fn payload(&self) -> FormParams {
        let mut params = FormParams::new();
        params.push("name", &self.name);
        params.push_opt(
            "dns_name",
            self.network
                .first()
                .map(|n| n.dns_name.as_str())
                .filter(|name| !name.is_empty()),
        );
        params.push("ram", self.ram);
        params.push("storage", self.storage.size);
        params.push("storage_type", self.storage.kind);
        params.push_opt("template", self.template.as_ref().map(|t| t.id));
        params.push_opt("site", self.site.as_ref().map(|s| s.id));
        params.push("cpu_count", self.cpu.cores);
        params.push("cpu_cap", self.cpu.cap);
        params
    }

    /// Rename the VM locally; sent on the next commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.require_id()?;
        self.original.name.get_or_insert_with(|| self.name.clone());
        self.name = name.into();
        Ok(())
    }

    /// Resize RAM locally; sent on the next commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id.
    pub fn set_ram(&mut self, ram: u64) -> Result<()> {
        self.require_id()?;
        self.original.ram.get_or_insert(self.ram);
        self.ram = ram;
        Ok(())
    }

    /// Resize storage locally; sent on the next commit. Shrinking requires a
    /// reinstall, which the commit confirms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id.
    pub fn set_storage(&mut self, size: u64) -> Result<()> {
        self.require_id()?;
        self.original.storage.get_or_insert(self.storage.size);
        self.storage.size = size;
        Ok(())
    }

    /// Change the core count locally; sent on the next commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id.
    pub fn set_cpu_cores(&mut self, cores: u32) -> Result<()> {
        self.require_id()?;
        self.original.cpu_cores.get_or_insert(self.cpu.cores);
        self.cpu.cores = cores;
        Ok(())
    }

    /// Change the CPU cap locally; sent on the next commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if the VM has no id.
    pub fn set_cpu_cap(&mut self, cap: u32) -> Result<()> {
        self.require_id()?;
        self.original.cpu_cap.get_or_insert(self.cpu.cap);
        self.cpu.cap = cap;
        Ok(())
    }

    /// Form body holding only the fields that differ from their pre-edit
    /// value.
    #[must_use]
    pub fn pending_changes(&self) -> FormParams {
        let mut changes = FormParams::new();

        if self
            .original
            .name
            .as_ref()
            .is_some_and(|name| *name != self.name)
        {
            changes.push("name", &self.name);
        }

        if self.original.ram.is_some_and(|ram| ram != self.ram) {
            changes.push("ram", self.ram);
        }

        if let Some(storage) = self.original.storage {
            if storage != self.storage.size {
                changes.push("storage", self.storage.size);
            }
            if self.storage.size < storage {
                changes.push("confirm_reinstall", true);
            }
        }

        if self
            .original
            .cpu_cores
            .is_some_and(|cores| cores != self.cpu.cores)
        {
            changes.push("cpu_count", self.cpu.cores);
        }

        if self.original.cpu_cap.is_some_and(|cap| cap != self.cpu.cap) {
            changes.push("cpu_cap", self.cpu.cap);
        }

        changes
    }

    /// Returns true when a commit would send anything.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.pending_changes().is_empty()
    }

    /// Forget the pre-edit values, making the current values the baseline.
    pub fn clear_changes(&mut self) {
        self.original = Original::default();
    }
}
