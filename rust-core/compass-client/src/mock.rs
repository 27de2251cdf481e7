// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scripted in-process [`Connector`] for tests and offline use.
//!
//! Routes are registered per method and URL and answered once each, in
//! registration order. Every request is recorded together with the
//! credentials of the session that sent it.
//!
//! ```rust
//! use std::sync::Arc;
//! use compass::mock::MockConnector;
//! use compass::{Credentials, Method, Server};
//!
//! let mock = MockConnector::new();
//! mock.respond(Method::Get, "http://db:2480/server", 200, r#"{"version":"1.0"}"#);
//!
//! let mut server = Server::with_connector("http://db:2480", Credentials::admin(), Arc::new(mock.clone())).unwrap();
//! server.info().unwrap();
//! assert_eq!(mock.requests().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::config::Credentials;
use crate::error::{CompassError, Result};
use crate::transport::{Connector, Method, Response, Transport};

/// A request as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    /// JSON body for POST and PUT.
    pub body: Option<Value>,
    pub credentials: Credentials,
}

#[derive(Debug)]
struct Route {
    method: Method,
    url: String,
    response: Response,
}

#[derive(Debug, Default)]
struct MockState {
    routes: VecDeque<Route>,
    requests: Vec<RecordedRequest>,
    sessions: Vec<Credentials>,
}

/// Connector answering from scripted routes.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `method` request to `url` with `status` and `body`.
    pub fn respond(&self, method: Method, url: &str, status: u16, body: impl Into<String>) -> &Self {
        if let Ok(mut state) = self.state.lock() {
            state.routes.push_back(Route {
                method,
                url: url.to_owned(),
                response: Response::new(status, body),
            });
        }
        self
    }

    /// Like [`respond`](Self::respond) with a JSON body.
    pub fn respond_json(&self, method: Method, url: &str, status: u16, body: &Value) -> &Self {
        self.respond(method, url, status, body.to_string())
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Credentials of every session opened so far.
    pub fn sessions(&self) -> Vec<Credentials> {
        self.state
            .lock()
            .map(|state| state.sessions.clone())
            .unwrap_or_default()
    }

    /// Number of routes not yet consumed.
    pub fn pending(&self) -> usize {
        self.state.lock().map(|state| state.routes.len()).unwrap_or(0)
    }
}

impl Connector for MockConnector {
    fn session(&self, credentials: &Credentials) -> Result<Arc<dyn Transport>> {
        self.state
            .lock()
            .map_err(|_| CompassError::LockPoisoned)?
            .sessions
            .push(credentials.clone());

        Ok(Arc::new(MockSession {
            state: Arc::clone(&self.state),
            credentials: credentials.clone(),
        }))
    }
}

struct MockSession {
    state: Arc<Mutex<MockState>>,
    credentials: Credentials,
}

impl MockSession {
    fn answer(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response> {
        let mut state = self.state.lock().map_err(|_| CompassError::LockPoisoned)?;

        state.requests.push(RecordedRequest {
            method,
            url: url.to_owned(),
            body: body.cloned(),
            credentials: self.credentials.clone(),
        });

        let position = state
            .routes
            .iter()
            .position(|route| route.method == method && route.url == url)
            .ok_or_else(|| CompassError::Transport(format!("No mock route for {method} {url}")))?;

        state
            .routes
            .remove(position)
            .map(|route| route.response)
            .ok_or_else(|| CompassError::Transport(format!("No mock route for {method} {url}")))
    }
}

impl Transport for MockSession {
    fn get(&self, url: &str) -> Result<Response> {
        self.answer(Method::Get, url, None)
    }

    fn post(&self, url: &str, body: &Value) -> Result<Response> {
        self.answer(Method::Post, url, Some(body))
    }

    fn put(&self, url: &str, body: &Value) -> Result<Response> {
        self.answer(Method::Put, url, Some(body))
    }

    fn delete(&self, url: &str) -> Result<Response> {
        self.answer(Method::Delete, url, None)
    }
}
