//! Cloud-init user data records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilaa_core::id::MetadataId;
use tilaa_core::{Error, FormParams, ResourceKind, Result};
use validator::Validate;

/// Named user data that can be attached to new virtual machines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Metadata {
    /// Record id; unset until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MetadataId>,
    /// Display name.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    /// Raw user data, usually a cloud-config document.
    #[serde(default)]
    pub user_data: String,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Describe a record to create.
    #[must_use]
    pub fn new(name: impl Into<String>, user_data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_data: user_data.into(),
            ..Self::default()
        }
    }

    /// Returns the id, or [`Error::NotCreated`] when the record does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if no id has been assigned.
    pub fn require_id(&self) -> Result<MetadataId> {
        self.id.ok_or(Error::NotCreated(ResourceKind::Metadata))
    }

    /// Form body for create and edit.
    #[must_use]
    pub fn payload(&self) -> FormParams {
        FormParams::new()
            .with("name", &self.name)
            .with("user_data", &self.user_data)
    }
}
