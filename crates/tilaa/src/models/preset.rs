//! Allowed resource sizes.

use serde::{Deserialize, Serialize};
use tilaa_core::{Error, Result};

use super::virtual_machine::{StorageType, VirtualMachine};

/// RAM sizes on offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RamPresets {
    /// Sizes in MB.
    #[serde(default)]
    pub sizes: Vec<u64>,
}

/// Storage sizes on offer for one disk technology.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoragePreset {
    /// Disk technology as reported by the API (`hdd`, `ssd`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Sizes in GB.
    #[serde(default)]
    pub sizes: Vec<u64>,
}

/// The resource sizes a virtual machine may be created or resized with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Presets {
    /// RAM sizes.
    #[serde(default)]
    pub ram: RamPresets,
    /// Storage sizes per disk technology.
    #[serde(default)]
    pub storage: Vec<StoragePreset>,
}

impl Presets {
    /// Returns true when `size` MB of RAM is on offer.
    #[must_use]
    pub fn supports_ram(&self, size: u64) -> bool {
        self.ram.sizes.contains(&size)
    }

    /// Storage sizes on offer for `kind`; empty when the type is not offered.
    #[must_use]
    pub fn storage_sizes(&self, kind: StorageType) -> &[u64] {
        self.storage
            .iter()
            .find(|preset| preset.kind == kind.as_str())
            .map(|preset| preset.sizes.as_slice())
            .unwrap_or_default()
    }

    /// Returns true when `size` GB of `kind` storage is on offer.
    #[must_use]
    pub fn supports_storage(&self, kind: StorageType, size: u64) -> bool {
        self.storage_sizes(kind).contains(&size)
    }

    /// Checks the RAM and storage of `machine` against the offered sizes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first unsupported value.
    pub fn check_machine(&self, machine: &VirtualMachine) -> Result<()> {
        if !self.supports_ram(machine.ram) {
            return Err(Error::Validation(format!(
                "ram size {} MB is not offered",
                machine.ram
            )));
        }

        if !self.supports_storage(machine.storage.kind, machine.storage.size) {
            return Err(Error::Validation(format!(
                "{} storage size {} GB is not offered",
                machine.storage.kind, machine.storage.size
            )));
        }

        Ok(())
    }
}
