//! Tilaa resource records.
//!
//! Plain data holders decoded from API responses. Operations that talk to the
//! API live on the services in [`crate::services`]; the convenience methods
//! on each record delegate there.

pub mod metadata;
pub mod preset;
pub mod site;
pub mod snapshot;
pub mod ssh_key;
pub mod template;
pub mod virtual_machine;

pub use metadata::Metadata;
pub use preset::{Presets, RamPresets, StoragePreset};
pub use site::Site;
pub use snapshot::{Snapshot, SnapshotStatus};
pub use ssh_key::SshKey;
pub use template::Template;
pub use virtual_machine::{
    Admin, Cpu, Network, NetworkFamily, Storage, StorageType, Task, VirtualMachine,
    VirtualMachineStatus,
};
