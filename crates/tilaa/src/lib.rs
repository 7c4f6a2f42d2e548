//! # tilaa
//!
//! Typed asynchronous client for the Tilaa hosting API.
//!
//! [`TilaaClient`] authenticates with HTTP basic auth and hands out one
//! service per resource:
//!
//! - [`services::VirtualMachineService`] - create, edit, cancel, power tasks,
//!   reinstall and snapshot handling
//! - [`services::SnapshotService`] - list, rename, delete and restore
//! - [`services::TemplateService`], [`services::SiteService`] and
//!   [`services::PresetService`] - read-only catalogues
//! - [`services::MetadataService`] - cloud-init user data
//! - [`services::SshKeyService`] - public keys
//!
//! Records in [`models`] carry convenience methods that take the client by
//! reference:
//!
//! ```no_run
//! use tilaa::models::{StorageType, VirtualMachine};
//! use tilaa::{SiteId, TemplateId, TilaaClient};
//!
//! # async fn run() -> tilaa::Result<()> {
//! let client = TilaaClient::new("user@example.com", "secret")?;
//!
//! let mut vm = VirtualMachine::new("web-01", SiteId::new(1), TemplateId::new(7))
//!     .with_ram(2048)
//!     .with_cpu(2, 100)
//!     .with_storage(40, StorageType::Ssd);
//! vm.create(&client).await?;
//!
//! vm.set_ram(4096)?;
//! vm.commit(&client).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod models;
pub mod services;

pub use client::{TilaaClient, TilaaClientBuilder};
pub use tilaa_core::id::{
    MetadataId, NetworkId, SiteId, SnapshotId, SshKeyId, TemplateId, UserId, VirtualMachineId,
};
pub use tilaa_core::{Error, ResourceKind, TilaaClientConfig};

/// Result type for Tilaa operations.
pub type Result<T> = tilaa_core::Result<T>;
