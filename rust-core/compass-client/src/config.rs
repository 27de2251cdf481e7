// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client configuration: credentials, storage engines and connection
//! defaults.
//!
//! The server ships three stock accounts (`admin`, `reader`, `writer`). They
//! are exposed as named constructors on [`Credentials`] and passed explicitly
//! wherever they are needed; nothing in the crate reads them from a global.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CompassError;

/// Default number of documents fetched when loading a class.
pub const DEFAULT_LIMIT: usize = 20;

/// Default query language of the command endpoint.
pub const DEFAULT_LANG: &str = "sql";

/// Username/password pair used for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The stock administrator account.
    pub fn admin() -> Self {
        Self::new("admin", "admin")
    }

    /// The stock read-only account.
    pub fn reader() -> Self {
        Self::new("reader", "reader")
    }

    /// The stock read-write account.
    pub fn writer() -> Self {
        Self::new("writer", "writer")
    }
}

// Passwords stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Storage engine requested when creating a database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// Volatile, in-memory storage.
    #[default]
    Memory,
    /// Legacy on-disk storage.
    Local,
    /// Paginated on-disk storage.
    Plocal,
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Memory => write!(f, "memory"),
            Storage::Local => write!(f, "local"),
            Storage::Plocal => write!(f, "plocal"),
        }
    }
}

impl FromStr for Storage {
    type Err = CompassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Storage::Memory),
            "local" => Ok(Storage::Local),
            "plocal" => Ok(Storage::Plocal),
            other => Err(CompassError::Validation(format!(
                "Unknown storage engine: {other}"
            ))),
        }
    }
}

/// Connection settings for a [`Server`](crate::Server).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST interface, e.g. `http://localhost:2480`.
    pub url: String,
    /// Credentials of the server session.
    pub credentials: Credentials,
    /// Credentials used to fetch a database right after creating it.
    pub admin: Credentials,
    /// Query language tag used by the command endpoint.
    pub lang: String,
    /// Storage engine used when creating databases.
    pub storage: Storage,
    /// Documents fetched per class load.
    pub default_limit: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:2480".to_string(),
            credentials: Credentials::admin(),
            admin: Credentials::admin(),
            lang: DEFAULT_LANG.to_string(),
            storage: Storage::Memory,
            default_limit: DEFAULT_LIMIT,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `COMPASS_*` environment variables.
    ///
    /// Recognised: `COMPASS_URL`, `COMPASS_USERNAME`, `COMPASS_PASSWORD`,
    /// `COMPASS_ADMIN_USERNAME`, `COMPASS_ADMIN_PASSWORD`, `COMPASS_LANG`,
    /// `COMPASS_STORAGE`, `COMPASS_LIMIT`, `COMPASS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, CompassError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the
    /// `COMPASS_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CompassError> {
        let mut config = Self::default();

        if let Some(url) = lookup("COMPASS_URL") {
            config.url = url;
        }
        if let Some(username) = lookup("COMPASS_USERNAME") {
            config.credentials.username = username;
        }
        if let Some(password) = lookup("COMPASS_PASSWORD") {
            config.credentials.password = password;
        }
        if let Some(username) = lookup("COMPASS_ADMIN_USERNAME") {
            config.admin.username = username;
        }
        if let Some(password) = lookup("COMPASS_ADMIN_PASSWORD") {
            config.admin.password = password;
        }
        if let Some(lang) = lookup("COMPASS_LANG") {
            config.lang = lang;
        }
        if let Some(storage) = lookup("COMPASS_STORAGE") {
            config.storage = storage.parse()?;
        }
        if let Some(limit) = lookup("COMPASS_LIMIT") {
            config.default_limit = limit.parse().map_err(|e| {
                CompassError::Validation(format!("Invalid COMPASS_LIMIT {limit:?}: {e}"))
            })?;
        }
        if let Some(secs) = lookup("COMPASS_TIMEOUT_SECS") {
            config.timeout_secs = secs.parse().map_err(|e| {
                CompassError::Validation(format!("Invalid COMPASS_TIMEOUT_SECS {secs:?}: {e}"))
            })?;
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_stock_credentials() {
        assert_eq!(Credentials::admin(), Credentials::new("admin", "admin"));
        assert_eq!(Credentials::reader().username, "reader");
        assert_eq!(Credentials::writer().password, "writer");
    }

    #[test]
    fn test_debug_hides_password() {
        let shown = format!("{:?}", Credentials::new("root", "hunter2"));
        assert!(shown.contains("root"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_storage_parse_and_display() {
        assert_eq!("PLOCAL".parse::<Storage>().unwrap(), Storage::Plocal);
        assert_eq!(Storage::Memory.to_string(), "memory");
        assert!("tape".parse::<Storage>().is_err());
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("COMPASS_URL", "http://db:2480"),
            ("COMPASS_USERNAME", "writer"),
            ("COMPASS_PASSWORD", "writer"),
            ("COMPASS_STORAGE", "local"),
            ("COMPASS_LIMIT", "50"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.url, "http://db:2480");
        assert_eq!(config.credentials, Credentials::writer());
        assert_eq!(config.admin, Credentials::admin());
        assert_eq!(config.storage, Storage::Local);
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.lang, "sql");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_lookup_rejects_bad_numbers() {
        let result = ClientConfig::from_lookup(|k| {
            (k == "COMPASS_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(CompassError::Validation(_))));
    }
}
