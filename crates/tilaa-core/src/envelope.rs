//! Response envelope shared by every Tilaa endpoint.
//!
//! Bodies look like `{"status": "OK", "message": "...", <payload fields>}`.
//! A `200 OK` transport status does not mean the operation succeeded: the
//! envelope status must be checked as well.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::error::{Error, Result};

/// Application-level status reported in every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The operation succeeded
    #[serde(rename = "OK")]
    Ok,
    /// The operation failed; `message` explains why
    #[serde(rename = "ERROR")]
    Error,
    /// Missing or unrecognised status
    #[default]
    #[serde(other)]
    Unknown,
}

/// Envelope with the payload fields kept undecoded until the status is known.
///
/// An `ERROR` response usually omits the payload, so the typed body is only
/// decoded by [`Envelope::into_result`] once the status is not `ERROR`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct Envelope<T> {
    /// Application-level status
    #[serde(default)]
    pub status: ResponseStatus,
    /// Optional human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining payload fields
    #[serde(flatten)]
    body: Map<String, Value>,
    #[serde(skip)]
    payload: PhantomData<T>,
}

impl<T> Envelope<T> {
    /// Returns true when the API reported an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }

    /// Raw payload fields next to `status` and `message`.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl<T> Envelope<T>
where
    T: DeserializeOwned,
{
    /// Converts an `ERROR` envelope into [`Error::Api`], decoding the body
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] carrying the response message when the status is
    /// `ERROR`, or [`Error::Decode`] when the payload does not match `T`.
    pub fn into_result(self) -> Result<T> {
        if self.is_error() {
            return Err(Error::Api(self.message.unwrap_or_default()));
        }
        serde_json::from_value(Value::Object(self.body))
            .map_err(|err| Error::Decode(format!("Unable to decode response payload: {err}")))
    }
}

/// Payload of action endpoints that only report a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Empty {}

/// Response of endpoints that return nothing but the envelope.
pub type StatusResponse = Envelope<Empty>;

/// Payload of creation endpoints that return the new record id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Created<I> {
    /// Id assigned by the API
    #[serde(default = "Option::default")]
    pub id: Option<I>,
}
