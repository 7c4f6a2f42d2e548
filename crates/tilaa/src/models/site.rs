//! Data center sites.

use serde::{Deserialize, Serialize};
use tilaa_core::id::SiteId;

/// A data center location a virtual machine can be placed in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    /// Site id.
    pub id: SiteId,
    /// Display name, e.g. `Amsterdam`.
    #[serde(default)]
    pub name: String,
}

impl Site {
    /// Reference a site by id only.
    #[must_use]
    pub fn from_id(id: SiteId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}
