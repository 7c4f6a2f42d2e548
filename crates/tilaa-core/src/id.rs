//! Strongly-typed identifiers for Tilaa resources.
//!
//! The API identifies every resource with a positive integer. Wrapping each
//! kind in its own type keeps a snapshot id from being passed where a virtual
//! machine id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed id wrapper types.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw numeric id.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric id.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Parses an id from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not a positive integer.
            pub fn parse_str(input: &str) -> Result<Self> {
                match input.trim().parse::<u64>() {
                    Ok(0) | Err(_) => Err(Error::Validation(format!(
                        "`{input}` is not a valid {}",
                        stringify!($name)
                    ))),
                    Ok(id) => Ok(Self(id)),
                }
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(wrapper: $name) -> Self {
                wrapper.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(VirtualMachineId, "Virtual machine id");
id_type!(SnapshotId, "Snapshot id");
id_type!(TemplateId, "Operating system template id");
id_type!(SiteId, "Data center site id");
id_type!(NetworkId, "Network interface id");
id_type!(MetadataId, "Metadata record id");
id_type!(SshKeyId, "SSH key id");
id_type!(UserId, "Account user id");
