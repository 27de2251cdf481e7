// SPDX-License-Identifier: PMPL-1.0-or-later

//! Server resource, the root of the object model.
//!
//! [`Server`] owns the base URL, the client configuration and a
//! [`Connector`]. Its own session answers server-level calls; every database
//! gets a new session authenticated with the credentials it was opened with.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::{ClientConfig, Credentials, Storage};
use crate::database::{Database, DatabaseParams};
use crate::endpoint::Endpoint;
use crate::error::{CompassError, Result};
use crate::resource::ResourceObject;
use crate::transport::{Connector, HttpConnector, Transport};

/// Handle to a document server.
pub struct Server {
    url: String,
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    session: Arc<dyn Transport>,
    data: ResourceObject,
}

impl Server {
    // -- Constructors -------------------------------------------------------

    /// Connect to `url` over HTTP with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::Validation`] if `url` cannot be parsed.
    pub fn new(url: &str, credentials: Credentials) -> Result<Self> {
        Self::from_config(ClientConfig {
            url: url.to_owned(),
            credentials,
            ..ClientConfig::default()
        })
    }

    /// Connect over HTTP using `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let connector = HttpConnector::new(config.timeout())?;
        Self::with_config(config, Arc::new(connector))
    }

    /// Use a custom connector with default settings.
    pub fn with_connector(
        url: &str,
        credentials: Credentials,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        Self::with_config(
            ClientConfig {
                url: url.to_owned(),
                credentials,
                ..ClientConfig::default()
            },
            connector,
        )
    }

    /// Use a custom connector and configuration.
    pub fn with_config(config: ClientConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        Url::parse(&config.url)
            .map_err(|e| CompassError::Validation(format!("Invalid base URL: {e}")))?;

        let url = config.url.trim_end_matches('/').to_owned();
        let session = connector.session(&config.credentials)?;

        Ok(Self {
            url,
            config,
            connector,
            session,
            data: ResourceObject::new(),
        })
    }

    // -- Accessors ----------------------------------------------------------

    /// Base URL without trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Information from the last successful [`info`](Self::info) call.
    pub fn data(&self) -> &ResourceObject {
        &self.data
    }

    // -- Server calls -------------------------------------------------------

    /// Fetch server information. A 204 answer leaves the data as it was.
    pub fn info(&mut self) -> Result<&ResourceObject> {
        let url = Endpoint::ServerInfo.url(&self.url);
        let response = self.session.get(&url)?;

        match response.status {
            200 => self.data.replace_json(response.json()?),
            204 => {}
            _ => return Err(response.into_error()),
        }
        Ok(&self.data)
    }

    /// Ask the server to drop the session. The answer is not inspected.
    pub fn disconnect(&self) -> Result<()> {
        let url = Endpoint::Disconnect.url(&self.url);
        let response = self.session.get(&url)?;
        if !(200..300).contains(&response.status) {
            warn!(status = response.status, "Disconnect not acknowledged");
        }
        Ok(())
    }

    /// Open existing database `name` with `credentials`.
    ///
    /// The descriptor is fetched through a fresh session scoped to
    /// `credentials`; the returned database is already connected.
    #[instrument(skip(self, credentials), fields(user = %credentials.username))]
    pub fn database(&self, name: &str, credentials: &Credentials) -> Result<Database> {
        let session = self.connector.session(credentials)?;
        let url = Endpoint::Database { db: name }.url(&self.url);
        let response = session.get(&url)?;

        if response.status != 200 {
            return Err(response.into_error());
        }

        let data: Value = response.json()?;
        let database = Database::open(
            DatabaseParams {
                url: self.url.clone(),
                name: name.to_owned(),
                lang: self.config.lang.clone(),
                credentials: credentials.clone(),
                default_limit: self.config.default_limit,
                session,
            },
            Some(data),
        )?;
        database.connect()?;
        Ok(database)
    }

    /// Create database `name` on `storage`, then open it with the admin
    /// credentials from the configuration.
    #[instrument(skip(self))]
    pub fn create_database(&self, name: &str, storage: Storage) -> Result<Database> {
        let url = Endpoint::CreateDatabase { db: name, storage }.url(&self.url);
        let response = self.session.post(&url, &Value::Null)?;

        if response.status != 200 {
            return Err(response.into_error());
        }

        info!(db = name, %storage, "Created database");
        self.database(name, &self.config.admin)
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("url", &self.url)
            .field("credentials", &self.config.credentials)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
