// SPDX-License-Identifier: PMPL-1.0-or-later

//! Database resource.
//!
//! A [`Database`] is a cheap, clonable handle to one server-side database and
//! the session authenticated for it. Klasses, clusters and documents keep a
//! clone as their back-reference, so they all observe the same metadata.
//!
//! The metadata (`data`) is only trustworthy right after [`Database::connect`]
//! or [`Database::reload`]. Reloads return a [`Reloaded`] snapshot so callers
//! that depend on fresh metadata (schema rebuilds) receive it explicitly
//! instead of re-reading shared state.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::cluster::Cluster;
use crate::config::Credentials;
use crate::document::Document;
use crate::endpoint::Endpoint;
use crate::error::{CompassError, Result};
use crate::klass::Klass;
use crate::resource::ResourceObject;
use crate::rid::{self, RECORD_CLASS, RECORD_ID};
use crate::transport::Transport;

/// Snapshot of database metadata taken by a successful reload.
#[derive(Debug, Clone)]
pub struct Reloaded {
    data: ResourceObject,
}

impl Reloaded {
    pub fn data(&self) -> &ResourceObject {
        &self.data
    }

    /// Class descriptors reported by the server.
    pub fn classes(&self) -> &[Value] {
        classes_of(&self.data)
    }

    /// Descriptor of the class called `name`.
    pub fn class(&self, name: &str) -> Option<&Value> {
        self.classes()
            .iter()
            .find(|class| class.get("name").and_then(Value::as_str) == Some(name))
    }
}

fn classes_of(data: &ResourceObject) -> &[Value] {
    data.get("classes")
        .ok()
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Take the `result` list out of a command or class response.
pub(crate) fn result_list(mut body: Value) -> Vec<Value> {
    match body.get_mut("result").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

struct DatabaseInner {
    url: String,
    name: String,
    lang: String,
    credentials: Credentials,
    default_limit: usize,
    session: Arc<dyn Transport>,
    data: RwLock<ResourceObject>,
}

/// Handle to a server-side database.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

/// Construction parameters shared by [`Server`](crate::Server) and tests.
pub(crate) struct DatabaseParams {
    pub url: String,
    pub name: String,
    pub lang: String,
    pub credentials: Credentials,
    pub default_limit: usize,
    pub session: Arc<dyn Transport>,
}

impl Database {
    /// Bind a database handle. Without initial `data` the handle connects
    /// straight away to obtain it.
    pub(crate) fn open(params: DatabaseParams, data: Option<Value>) -> Result<Self> {
        let needs_connect = data.is_none();
        let database = Database {
            inner: Arc::new(DatabaseInner {
                url: params.url,
                name: params.name,
                lang: params.lang,
                credentials: params.credentials,
                default_limit: params.default_limit,
                session: params.session,
                data: RwLock::new(ResourceObject::from_json(data.unwrap_or(Value::Null), &[])),
            }),
        };

        if needs_connect {
            database.connect()?;
        }
        Ok(database)
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Query language tag used by [`query`](Self::query).
    pub fn lang(&self) -> &str {
        &self.inner.lang
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn default_limit(&self) -> usize {
        self.inner.default_limit
    }

    pub(crate) fn session(&self) -> &dyn Transport {
        self.inner.session.as_ref()
    }

    pub(crate) fn endpoint(&self, endpoint: Endpoint<'_>) -> String {
        endpoint.url(&self.inner.url)
    }

    /// Snapshot of the current metadata.
    pub fn data(&self) -> Result<ResourceObject> {
        let data = self.inner.data.read().map_err(|_| CompassError::LockPoisoned)?;
        Ok(data.clone())
    }

    /// Value of one metadata key.
    pub fn get(&self, key: &str) -> Result<Value> {
        let data = self.inner.data.read().map_err(|_| CompassError::LockPoisoned)?;
        data.get(key).cloned()
    }

    /// Class descriptors from the current metadata.
    pub fn classes(&self) -> Result<Vec<Value>> {
        let data = self.inner.data.read().map_err(|_| CompassError::LockPoisoned)?;
        Ok(classes_of(&data).to_vec())
    }

    fn replace_data(&self, value: Value) -> Result<()> {
        let mut data = self.inner.data.write().map_err(|_| CompassError::LockPoisoned)?;
        data.replace_json(value);
        Ok(())
    }

    /// Open the database session and refresh the metadata.
    ///
    /// A 204 answer is a success without payload and keeps the current data.
    #[instrument(skip(self), fields(db = %self.inner.name))]
    pub fn connect(&self) -> Result<&Self> {
        let url = self.endpoint(Endpoint::Connect { db: self.name() });
        let response = self.session().get(&url)?;

        match response.status {
            200 => {
                self.replace_data(response.json()?)?;
                info!(db = %self.name(), "Connected to database");
            }
            204 => debug!(db = %self.name(), "Connected to database (no payload)"),
            _ => return Err(response.into_error()),
        }
        Ok(self)
    }

    /// Re-read the database descriptor, replacing the metadata.
    #[instrument(skip(self), fields(db = %self.inner.name))]
    pub fn reload(&self) -> Result<Reloaded> {
        let url = self.endpoint(Endpoint::Database { db: self.name() });
        let response = self.session().get(&url)?;

        if response.status != 200 {
            return Err(response.into_error());
        }

        let value = response.json()?;
        self.replace_data(value.clone())?;
        debug!(db = %self.name(), "Reloaded database metadata");

        Ok(Reloaded {
            data: ResourceObject::from_json(value, &[]),
        })
    }

    /// Reload, then hand the fresh metadata to `callback`.
    ///
    /// The callback never runs when the reload fails.
    pub fn reload_with<T, F>(&self, callback: F) -> Result<T>
    where
        F: FnOnce(&Reloaded) -> Result<T>,
    {
        let reloaded = self.reload()?;
        callback(&reloaded)
    }

    /// Storage cluster metadata for `class_name`. `None` when the server has
    /// nothing to report (204).
    pub fn cluster(&self, class_name: &str) -> Result<Option<Cluster>> {
        let url = self.endpoint(Endpoint::Cluster {
            db: self.name(),
            class: class_name,
        });
        let response = self.session().get(&url)?;

        match response.status {
            200 => Ok(Some(Cluster::new(self.clone(), response.json()?))),
            204 => Ok(None),
            _ => Err(response.into_error()),
        }
    }

    /// Load class `name` with up to `limit` of its documents.
    pub fn klass(&self, name: &str, limit: usize) -> Result<Klass> {
        let url = self.endpoint(Endpoint::Klass {
            db: self.name(),
            class: name,
            limit,
        });
        let response = self.session().get(&url)?;

        if response.status != 200 {
            return Err(response.into_error());
        }

        let documents = result_list(response.json()?);
        debug!(db = %self.name(), class = name, documents = documents.len(), "Loaded class");
        Klass::new(self.clone(), Some(name.to_owned()), documents)
    }

    /// Create class `name`, then load it with the default limit.
    pub fn create_klass(&self, name: &str) -> Result<Klass> {
        let url = self.endpoint(Endpoint::CreateKlass {
            db: self.name(),
            class: name,
        });
        let response = self.session().post(&url, &Value::Object(Map::new()))?;

        if response.status != 201 {
            return Err(response.into_error());
        }

        info!(db = %self.name(), class = name, "Created class");
        self.klass(name, self.default_limit())
    }

    fn command(&self, query: &str) -> Result<Vec<Value>> {
        let url = self.endpoint(Endpoint::Command {
            db: self.name(),
            lang: self.lang(),
            query,
        });
        let response = self.session().post(&url, &Value::Object(Map::new()))?;

        if response.status != 200 {
            return Err(response.into_error());
        }
        Ok(result_list(response.json()?))
    }

    /// Run `query` and wrap the resulting documents in a new, anonymous
    /// [`Klass`].
    #[instrument(skip(self), fields(db = %self.inner.name))]
    pub fn query(&self, query: &str) -> Result<Klass> {
        let documents = self.command(query)?;
        Klass::new(self.clone(), None, documents)
    }

    /// Run `query` and replace `klass`'s document cache with the result.
    #[instrument(skip(self, klass), fields(db = %self.inner.name))]
    pub fn query_into(&self, query: &str, klass: &mut Klass) -> Result<()> {
        let documents = self.command(query)?;
        klass.define_documents(documents, true)?;
        Ok(())
    }

    /// Fetch the document `rid` (with or without its leading `#`).
    pub fn document(&self, rid: &str) -> Result<Document> {
        let rid = rid::normalize(rid);
        let url = self.endpoint(Endpoint::Document {
            db: self.name(),
            rid,
        });
        let response = self.session().get(&url)?;

        if response.status != 200 {
            return Err(response.into_error());
        }
        Ok(Document::new(rid, response.json()?, self.clone(), None))
    }

    /// Store a new document and return its canonical stored form.
    ///
    /// `class_name`, when given, is written to the `@class` field. The server
    /// assigns the RID; the document is then fetched again by that RID.
    pub fn create_document(
        &self,
        class_name: Option<&str>,
        mut fields: Map<String, Value>,
    ) -> Result<Document> {
        if let Some(class_name) = class_name {
            fields.insert(RECORD_CLASS.to_owned(), Value::String(class_name.to_owned()));
        }

        let url = self.endpoint(Endpoint::Documents { db: self.name() });
        let response = self.session().post(&url, &Value::Object(fields))?;

        if response.status != 201 {
            return Err(response.into_error());
        }

        let content = response.json()?;
        let rid = content
            .get(RECORD_ID)
            .and_then(Value::as_str)
            .ok_or_else(|| CompassError::MissingField(RECORD_ID.to_owned()))?;
        let rid = rid::normalize(rid).to_owned();
        info!(db = %self.name(), rid = %rid, "Created document");

        let document = self.document(&rid)?;
        Ok(match class_name {
            Some(class_name) => document.with_class(class_name),
            None => document,
        })
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("url", &self.inner.url)
            .field("name", &self.inner.name)
            .field("lang", &self.inner.lang)
            .field("credentials", &self.inner.credentials)
            .finish_non_exhaustive()
    }
}
