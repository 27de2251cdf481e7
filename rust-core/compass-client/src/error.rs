// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the Compass client.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, CompassError>`. Remote failures carry the raw
//! response body untouched so callers see exactly what the server said; the
//! key errors are raised locally and never touch the network.

use thiserror::Error;

/// Error type for every Compass operation.
#[derive(Error, Debug)]
pub enum CompassError {
    /// The server answered with a status outside the success set of the
    /// endpoint.
    #[error("Remote error (HTTP {status}): {body}")]
    Remote {
        /// HTTP status code returned by the server.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Attempt to set or delete a key that is immutable for the resource
    /// (`@rid` on documents).
    #[error("{0} is not editable")]
    ImmutableKey(String),

    /// Read of a key the resource does not hold.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A server payload lacks a field the client needs.
    #[error("Missing field in server response: {0}")]
    MissingField(String),

    /// An underlying HTTP / network error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failure that did not come from `reqwest`.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Client-side validation failed before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Lock poisoned: internal concurrency error")]
    LockPoisoned,
}

impl CompassError {
    /// Build a [`CompassError::Remote`] from a status and raw body.
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        CompassError::Remote {
            status,
            body: body.into(),
        }
    }

    /// The raw response body for remote failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            CompassError::Remote { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The HTTP status for remote failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            CompassError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Crate-level result alias using [`CompassError`].
pub type Result<T> = std::result::Result<T, CompassError>;
