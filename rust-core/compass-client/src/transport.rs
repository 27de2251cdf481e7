// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP transport layer.
//!
//! Resources talk to the server through a [`Transport`] session bound to one
//! set of credentials. A [`Connector`] hands out sessions; the server handle
//! keeps one so it can open a fresh session per database with whatever
//! credentials the caller supplies.
//!
//! The transport does not interpret status codes. It returns the status and
//! the raw body; each resource decides what counts as success.

use std::fmt;
use std::sync::{Arc, Once};
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Credentials;
use crate::error::{CompassError, Result};

/// HTTP verbs used by the REST interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Status and raw body of a server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON. An empty body parses as `null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(CompassError::Serialization)
    }

    /// Turn this response into a [`CompassError::Remote`].
    pub fn into_error(self) -> CompassError {
        CompassError::Remote {
            status: self.status,
            body: self.body,
        }
    }
}

/// An authenticated request session.
///
/// Implementations block until the server answers. Errors are reserved for
/// failures to obtain a response at all; any status code is a valid
/// [`Response`].
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Response>;

    /// POST `body` as JSON. `Value::Null` sends no body.
    fn post(&self, url: &str, body: &Value) -> Result<Response>;

    fn put(&self, url: &str, body: &Value) -> Result<Response>;

    fn delete(&self, url: &str) -> Result<Response>;
}

/// Factory of [`Transport`] sessions.
pub trait Connector: Send + Sync {
    /// Open a session authenticated with `credentials`.
    fn session(&self, credentials: &Credentials) -> Result<Arc<dyn Transport>>;
}

static CRYPTO_PROVIDER: Once = Once::new();

/// [`Connector`] backed by a blocking `reqwest` client.
///
/// All sessions share one connection-pooled client; each carries its own
/// Basic credentials.
#[derive(Clone)]
pub struct HttpConnector {
    http: Client,
}

impl HttpConnector {
    /// Build a connector whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        // reqwest is built without a bundled provider; install ring once.
        CRYPTO_PROVIDER.call_once(|| {
            let _ = rustls::crypto::ring::default_provider().install_default();
        });

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CompassError::Network)?;
        Ok(Self { http })
    }
}

impl Connector for HttpConnector {
    fn session(&self, credentials: &Credentials) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(HttpTransport {
            http: self.http.clone(),
            credentials: credentials.clone(),
        }))
    }
}

/// A Basic-authenticated session over `reqwest::blocking`.
pub struct HttpTransport {
    http: Client,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[instrument(skip(self, builder), fields(user = %self.credentials.username))]
    fn send(
        &self,
        method: Method,
        url: &str,
        builder: reqwest::blocking::RequestBuilder,
    ) -> Result<Response> {
        let response = builder
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(%method, url, status, bytes = body.len(), "Request completed");
        Ok(Response { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response> {
        self.send(Method::Get, url, self.http.get(url))
    }

    fn post(&self, url: &str, body: &Value) -> Result<Response> {
        let builder = match body {
            Value::Null => self.http.post(url),
            body => self.http.post(url).json(body),
        };
        self.send(Method::Post, url, builder)
    }

    fn put(&self, url: &str, body: &Value) -> Result<Response> {
        self.send(Method::Put, url, self.http.put(url).json(body))
    }

    fn delete(&self, url: &str) -> Result<Response> {
        self.send(Method::Delete, url, self.http.delete(url))
    }
}
