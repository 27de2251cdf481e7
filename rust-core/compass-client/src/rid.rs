// SPDX-License-Identifier: PMPL-1.0-or-later

//! Record identifiers.
//!
//! The server reports RIDs as `#<cluster>:<position>` (e.g. `#12:0`). Inside
//! the client a RID is always held without its leading `#`: it is the key of
//! the Klass document cache and the last segment of document URLs.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the field holding a document's record identifier.
pub const RECORD_ID: &str = "@rid";

/// Name of the field holding a document's class.
pub const RECORD_CLASS: &str = "@class";

/// A normalized record identifier.
///
/// Construction strips exactly one leading `#`; the value never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rid(String);

impl Rid {
    /// Normalize `raw` into a RID.
    pub fn new(raw: &str) -> Self {
        Rid(normalize(raw).to_owned())
    }

    /// The normalized identifier, without `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier in the server's reference form (`#12:0`).
    pub fn to_reference(&self) -> String {
        format!("#{}", self.0)
    }
}

/// Strip exactly one leading `#` from `raw`.
pub fn normalize(raw: &str) -> &str {
    raw.strip_prefix('#').unwrap_or(raw)
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Rid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Rid {
    fn from(raw: &str) -> Self {
        Rid::new(raw)
    }
}

impl From<String> for Rid {
    fn from(raw: String) -> Self {
        Rid(normalize(&raw).to_owned())
    }
}

impl Serialize for Rid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_reference())
    }
}

impl<'de> Deserialize<'de> for Rid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Rid::from(raw))
    }
}
