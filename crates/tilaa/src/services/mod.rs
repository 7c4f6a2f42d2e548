//! Per-resource API services.
//!
//! Each service borrows a [`TilaaClient`](crate::TilaaClient) and maps one
//! REST collection onto typed methods. The record types in
//! [`crate::models`] also get convenience methods here that take the client
//! by reference and delegate to the matching service.

pub mod metadata;
pub mod preset;
pub mod site;
pub mod snapshot;
pub mod ssh_key;
pub mod template;
pub mod virtual_machine;

pub use metadata::MetadataService;
pub use preset::PresetService;
pub use site::SiteService;
pub use snapshot::SnapshotService;
pub use ssh_key::SshKeyService;
pub use template::TemplateService;
pub use virtual_machine::VirtualMachineService;
