//! # tilaa-core
//!
//! Core types and utilities for working with the Tilaa hosting API.
//!
//! This crate provides the shared error type, client configuration, typed
//! resource identifiers and the basic-auth HTTP transport that the resource
//! services in the `tilaa` crate are built on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`id`] - Strongly-typed numeric identifiers for Tilaa resources
//! - [`config`] - Endpoint configuration and credentials
//! - [`form`] - Form-encoded request body builder
//! - [`envelope`] - The `status`/`message` wrapper around every response
//! - [`client`] - The authenticated HTTP transport

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod id;

// Re-export commonly used types
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{Credentials, TilaaClientConfig};
pub use envelope::{Envelope, ResponseStatus, StatusResponse};
pub use error::{Error, ResourceKind, Result};
pub use form::FormParams;
