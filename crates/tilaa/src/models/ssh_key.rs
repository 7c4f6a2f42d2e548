//! SSH public keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilaa_core::id::{SshKeyId, UserId};
use tilaa_core::{Error, FormParams, ResourceKind, Result};
use validator::Validate;

/// A public key installed into new virtual machines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct SshKey {
    /// Key id; unset until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SshKeyId>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Display label.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub label: String,
    /// Public key in OpenSSH format.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub key: String,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl SshKey {
    /// Describe a key to upload.
    #[must_use]
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    /// Assign the key to a user.
    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Returns the id, or [`Error::NotCreated`] when the key does not exist
    /// yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCreated`] if no id has been assigned.
    pub fn require_id(&self) -> Result<SshKeyId> {
        self.id.ok_or(Error::NotCreated(ResourceKind::SshKey))
    }

    /// Form body for create and edit.
    #[must_use]
    pub fn payload(&self) -> FormParams {
        let mut params = FormParams::new();
        params.push_opt("user_id", self.user_id);
        params.push("label", &self.label);
        params.push("key", &self.key);
        params
    }

    /// Returns true when `other` holds the same label and key material.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.label == other.label && self.key.trim() == other.key.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIGq4 admin@example";

    #[test]
    fn payload_skips_missing_user() {
        let key = SshKey::new("laptop", KEY);
        let payload = key.payload();
        assert!(!payload.contains("user_id"));
        assert_eq!(payload.get("label"), Some("laptop"));
        assert_eq!(payload.get("key"), Some(KEY));

        let payload = key.with_user(UserId::new(77)).payload();
        assert_eq!(payload.get("user_id"), Some("77"));
    }

    #[test]
    fn same_key_ignores_trailing_whitespace() {
        let local = SshKey::new("laptop", format!("{KEY}\n"));
        let remote = SshKey::new("laptop", KEY);
        assert!(local.same_key(&remote));
        assert!(!local.same_key(&SshKey::new("desktop", KEY)));
    }

    #[test]
    fn validation_requires_label_and_key() {
        assert!(SshKey::new("", KEY).validate().is_err());
        assert!(SshKey::new("laptop", "").validate().is_err());
        assert!(SshKey::new("laptop", KEY).validate().is_ok());
    }
}
