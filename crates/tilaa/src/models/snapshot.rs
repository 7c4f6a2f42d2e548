//! Virtual machine snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilaa_core::id::SnapshotId;
use tilaa_core::{Error, ResourceKind, Result};

use super::template::Template;

/// Snapshot state reported by the API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// The snapshot completed and can be restored.
    Success,
    /// Any other state.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A point-in-time copy of a virtual machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Snapshot id; unset until the snapshot exists remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SnapshotId>,
    /// Snapshot name.
    #[serde(default)]
    pub name: String,
    /// Storage size of the source VM in GB.
    #[serde(default)]
    pub storage: u64,
    /// RAM of the source VM in MB.
    #[serde(default)]
    pub ram: u64,
    /// Template of the source VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    /// Snapshot state.
    #[serde(default)]
    pub status: SnapshotStatus,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Describe a snapshot to create.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the id, or [`Error::NotCreated`] when the snapshot does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if no id has been assigned.
    pub fn require_id(&self) -> Result<SnapshotId> {
        self.id.ok_or(Error::NotCreated(ResourceKind::Snapshot))
    }
}
