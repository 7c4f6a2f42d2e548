//! Error types for Tilaa operations.
//!
//! This module provides the error type shared by the transport and every
//! resource service, including HTTP status code mapping and stable error codes.

use std::fmt;
use thiserror::Error;

/// Resource types that must exist remotely before they can be operated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A virtual machine
    VirtualMachine,
    /// A virtual machine snapshot
    Snapshot,
    /// A metadata (user data) record
    Metadata,
    /// An SSH public key
    SshKey,
}

impl ResourceKind {
    /// Returns the human-readable resource name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::VirtualMachine => "Virtual Machine",
            Self::Snapshot => "Snapshot",
            Self::Metadata => "Metadata",
            Self::SshKey => "SshKey",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for Tilaa operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The API answered with `"status": "ERROR"`
    #[error("API Error: {0}")]
    Api(String),

    /// The request could not be sent or returned a non-200 status
    #[error("API Request Error: {0}")]
    RequestFailed(String),

    /// The API rejected the basic-auth credentials
    #[error("Invalid API Credentials: username `{username}` or password invalid")]
    InvalidCredentials {
        /// Username that was rejected
        username: String,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The response body could not be decoded
    #[error("Results Decoder Error: Unable to decode result ({0})")]
    Decode(String),

    /// Unknown virtual machine task
    #[error("Invalid Task: {0}")]
    InvalidTask(String),

    /// Cancellation date not offered by the API
    #[error("Invalid Cancel Date: {0}")]
    InvalidCancelDate(String),

    /// The record has no id yet
    #[error("{0} has not been created yet.")]
    NotCreated(ResourceKind),

    /// The virtual machine has no pending cancellation
    #[error("Virtual Machine was not cancelled.")]
    NotCancelled,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Tilaa operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api(_) => "API_ERROR",
            Self::RequestFailed(_) => "REQUEST_FAILED",
            Self::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::InvalidTask(_) => "INVALID_TASK",
            Self::InvalidCancelDate(_) => "INVALID_CANCEL_DATE",
            Self::NotCreated(_) => "NOT_CREATED",
            Self::NotCancelled => "NOT_CANCELLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true when the error originated on the remote side rather than
    /// in local argument checking.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Api(_)
                | Self::RequestFailed(_)
                | Self::InvalidCredentials { .. }
                | Self::NotFound(_)
                | Self::ServiceUnavailable(_)
                | Self::Timeout(_)
                | Self::Decode(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
