// SPDX-License-Identifier: PMPL-1.0-or-later

//! Class resource: a document cache plus a lazily discovered schema.
//!
//! The document cache is keyed by normalized RID and is first-write-wins: a
//! document already cached is never replaced by a later server copy unless
//! the cache is reset. The schema starts out empty and [`SchemaState::Unsynced`];
//! it is only rebuilt from database metadata after a reload, either as part
//! of creating a property or through [`Klass::sync_schema`].

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::database::{Database, Reloaded};
use crate::document::Document;
use crate::error::{CompassError, Result};
use crate::property::KlassProperty;
use crate::resource::ResourceObject;
use crate::rid::{self, Rid, RECORD_ID};

/// Whether the schema reflects reloaded database metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// No reload has populated the schema yet.
    Unsynced,
    /// The schema was rebuilt from the metadata of a completed reload.
    Synced,
}

/// Outcome of [`Klass::property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyChange {
    Created,
    Deleted,
    Unchanged,
}

/// A document class.
#[derive(Debug, Clone)]
pub struct Klass {
    /// `None` for the ad-hoc classes returned by queries.
    name: Option<String>,
    database: Database,
    schema: HashMap<String, KlassProperty>,
    schema_state: SchemaState,
    data: ResourceObject<Document>,
}

impl Klass {
    pub(crate) fn new(database: Database, name: Option<String>, documents: Vec<Value>) -> Result<Self> {
        let mut klass = Self {
            name,
            database,
            schema: HashMap::new(),
            schema_state: SchemaState::Unsynced,
            data: ResourceObject::new(),
        };
        klass.define_documents(documents, false)?;
        Ok(klass)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Add server-reported documents to the cache.
    ///
    /// `reset` empties the cache first. Documents whose RID is already cached
    /// are skipped. Returns the number of documents inserted.
    pub fn define_documents(&mut self, documents: Vec<Value>, reset: bool) -> Result<usize> {
        // Every document must carry a RID before the cache is touched.
        let identified = documents
            .into_iter()
            .map(|data| {
                let rid = data
                    .get(RECORD_ID)
                    .and_then(Value::as_str)
                    .map(Rid::new)
                    .ok_or_else(|| CompassError::MissingField(RECORD_ID.to_owned()))?;
                Ok((rid, data))
            })
            .collect::<Result<Vec<_>>>()?;

        if reset {
            self.data.clear();
        }

        let mut inserted = 0;
        for (rid, data) in identified {
            if self.data.contains(rid.as_str()) {
                continue;
            }

            let document = Document::new(rid.as_str(), data, self.database.clone(), self.name.clone());
            self.data.insert_raw(rid.as_str().to_owned(), document);
            inserted += 1;
        }

        debug!(class = ?self.name, inserted, cached = self.data.size(), reset, "Defined documents");
        Ok(inserted)
    }

    /// Cached document `rid` (with or without its leading `#`).
    pub fn get(&self, rid: &str) -> Result<&Document> {
        self.data.get(rid::normalize(rid))
    }

    pub fn get_mut(&mut self, rid: &str) -> Result<&mut Document> {
        self.data.get_mut(rid::normalize(rid))
    }

    pub fn contains(&self, rid: &str) -> bool {
        self.data.contains(rid::normalize(rid))
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Normalized RIDs of the cached documents.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.data.values()
    }

    /// Remove document `rid` from the cache and hand it over.
    pub fn take(&mut self, rid: &str) -> Option<Document> {
        self.data.remove(rid::normalize(rid)).ok()
    }

    /// Remove document `rid` from the cache and delete it server-side.
    pub fn delete_document(&mut self, rid: &str) -> Result<()> {
        let document = self
            .take(rid)
            .ok_or_else(|| CompassError::KeyNotFound(rid::normalize(rid).to_owned()))?;
        document.delete()
    }

    /// Replace the cache with the result of `query`.
    pub fn query(&mut self, query: &str) -> Result<()> {
        let database = self.database.clone();
        database.query_into(query, self)
    }

    /// Fetch document `rid` from the server. The cache is not touched.
    pub fn document(&self, rid: &str) -> Result<Document> {
        let document = self.database.document(rid)?;
        Ok(match self.name() {
            Some(name) => document.with_class(name),
            None => document,
        })
    }

    /// Store a new document of this class.
    pub fn create_document(&self, fields: Map<String, Value>) -> Result<Document> {
        self.database.create_document(self.name(), fields)
    }

    pub fn schema(&self) -> &HashMap<String, KlassProperty> {
        &self.schema
    }

    pub fn schema_state(&self) -> SchemaState {
        self.schema_state
    }

    /// Create or drop schema property `name`.
    ///
    /// A property already in the schema is dropped server-side and removed,
    /// whatever `create` says. Otherwise, with `create`, the property is
    /// created and the schema rebuilt from the reload that follows.
    #[instrument(skip(self), fields(class = ?self.name))]
    pub fn property(&mut self, name: &str, create: bool) -> Result<PropertyChange> {
        let class_name = self.require_name()?.to_owned();

        if let Some(property) = self.schema.get(name) {
            property.delete()?;
            self.schema.remove(name);
            return Ok(PropertyChange::Deleted);
        }

        if create {
            let database = self.database.clone();
            KlassProperty::create(&database, &class_name, name, |reloaded| {
                self.define_schema(reloaded);
                Ok(())
            })?;
            return Ok(PropertyChange::Created);
        }

        Ok(PropertyChange::Unchanged)
    }

    /// Reload the database and rebuild the schema from its metadata.
    pub fn sync_schema(&mut self) -> Result<()> {
        self.require_name()?;
        let database = self.database.clone();
        database.reload_with(|reloaded| {
            self.define_schema(reloaded);
            Ok(())
        })
    }

    fn require_name(&self) -> Result<&str> {
        self.name()
            .ok_or_else(|| CompassError::Validation("query result classes have no schema".to_string()))
    }

    /// Add every property reported for this class that the schema lacks,
    /// keyed by property name.
    fn define_schema(&mut self, reloaded: &Reloaded) {
        let Some(class_name) = self.name.as_deref() else {
            return;
        };

        let properties = reloaded
            .class(class_name)
            .and_then(|class| class.get("properties"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for property in properties {
            let Some(name) = property.get("name").and_then(Value::as_str) else {
                continue;
            };
            if !self.schema.contains_key(name) {
                let property =
                    KlassProperty::from_server(self.database.clone(), class_name, name, property.clone());
                self.schema.insert(name.to_owned(), property);
            }
        }

        self.schema_state = SchemaState::Synced;
        debug!(class = class_name, properties = self.schema.len(), "Schema synced");
    }
}
