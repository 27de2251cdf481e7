// SPDX-License-Identifier: PMPL-1.0-or-later

//! # Compass
//!
//! A client object model for the OrientDB REST interface. Servers, databases,
//! classes, class properties, clusters and documents are plain Rust values
//! that issue blocking HTTP calls and turn status codes into either fresh
//! local state or a [`CompassError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use compass::{Credentials, RelateTarget, Server, Storage};
//! use serde_json::{json, Map};
//!
//! fn main() -> compass::Result<()> {
//!     let server = Server::new("http://localhost:2480", Credentials::admin())?;
//!     let database = server.create_database("demo", Storage::Memory)?;
//!
//!     let mut people = database.create_klass("Person")?;
//!     people.property("name", true)?;
//!
//!     let mut fields = Map::new();
//!     fields.insert("name".into(), json!("Ada"));
//!     let ada = people.create_document(fields)?;
//!
//!     let mut bob = people.create_document(Map::new())?;
//!     bob.set("friends", json!([]))?;
//!     bob.relate("friends", RelateTarget::Document(&ada), true)?;
//!     bob.save()?;
//!
//!     people.query("select from Person")?;
//!     println!("{} people", people.size());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`server`] — root resource; server info and database lookup/creation.
//! - [`database`] — database metadata, reloads, queries, class and document access.
//! - [`klass`] — document cache and lazily synced schema of a class.
//! - [`property`] — schema property creation and removal.
//! - [`document`] — record identity, field edits, relations, save and delete.
//! - [`cluster`] — read-only cluster metadata.
//! - [`resource`] — the key/value container behind every resource.
//! - [`rid`] — record identifier normalization.
//! - [`endpoint`] — REST URL templates and query escaping.
//! - [`transport`] — HTTP sessions and the connector seam.
//! - [`mock`] — scripted connector for tests.
//! - [`config`] — credentials, storage engines, client settings.
//! - [`error`] — error types and the crate-level `Result` alias.

pub mod cluster;
pub mod config;
pub mod database;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod klass;
pub mod mock;
pub mod property;
pub mod resource;
pub mod rid;
pub mod server;
pub mod transport;

pub use cluster::Cluster;
pub use config::{ClientConfig, Credentials, Storage, DEFAULT_LANG, DEFAULT_LIMIT};
pub use database::{Database, Reloaded};
pub use document::{Document, RelateTarget};
pub use error::{CompassError, Result};
pub use klass::{Klass, PropertyChange, SchemaState};
pub use property::KlassProperty;
pub use resource::ResourceObject;
pub use rid::{Rid, RECORD_CLASS, RECORD_ID};
pub use server::Server;
pub use transport::{Connector, HttpConnector, HttpTransport, Method, Response, Transport};
