//! Operating system templates.

use serde::{Deserialize, Serialize};
use tilaa_core::id::TemplateId;

/// An installable operating system image.
///
/// Some templates report `0` for `ram` and `storage`; in that case the preset
/// minimum applies. A few templates come back without a name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    /// Template id.
    pub id: TemplateId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Minimum RAM in MB.
    #[serde(default)]
    pub ram: u64,
    /// Minimum storage in GB.
    #[serde(default)]
    pub storage: u64,
}

impl Template {
    /// Reference a template by id only.
    #[must_use]
    pub fn from_id(id: TemplateId) -> Self {
        Self {
            id,
            name: String::new(),
            ram: 0,
            storage: 0,
        }
    }
}
