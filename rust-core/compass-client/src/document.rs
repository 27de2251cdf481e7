// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document resource.
//!
//! A [`Document`] is one persisted record keyed by its normalized RID. Its
//! `@rid` field cannot be set or deleted through the client. Local edits
//! (including [`Document::relate`]) are not persisted until
//! [`Document::save`]. [`Document::delete`] consumes the value: once the
//! record is gone server-side there is nothing left to use.

use serde_json::Value;
use tracing::info;

use crate::database::Database;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::resource::ResourceObject;
use crate::rid::{Rid, RECORD_CLASS, RECORD_ID};

const IMMUTABLE: &[&str] = &[RECORD_ID];

/// What a relation field should point at.
#[derive(Debug, Clone, Copy)]
pub enum RelateTarget<'a> {
    /// Another document; its `@rid` field is used.
    Document(&'a Document),
    /// A RID given directly, stored as written.
    Rid(&'a str),
}

/// A persisted record.
#[derive(Debug, Clone)]
pub struct Document {
    rid: Rid,
    data: ResourceObject,
    database: Database,
    class_name: Option<String>,
}

impl Document {
    pub(crate) fn new(rid: &str, data: Value, database: Database, class_name: Option<String>) -> Self {
        Self {
            rid: Rid::new(rid),
            data: ResourceObject::from_json(data, IMMUTABLE),
            database,
            class_name,
        }
    }

    pub(crate) fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_owned());
        self
    }

    /// Normalized record identifier.
    pub fn rid(&self) -> &Rid {
        &self.rid
    }

    /// The RID as other documents should reference it: the `@rid` field when
    /// present, the `#`-prefixed RID otherwise.
    pub fn reference(&self) -> String {
        self.data
            .get(RECORD_ID)
            .ok()
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| self.rid.to_reference())
    }

    /// The `@class` field, or the class the document was loaded through.
    pub fn class_name(&self) -> Option<&str> {
        self.data
            .get(RECORD_CLASS)
            .ok()
            .and_then(Value::as_str)
            .or(self.class_name.as_deref())
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn data(&self) -> &ResourceObject {
        &self.data
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        self.data.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Result<()> {
        self.data.set(field, value)
    }

    pub fn remove(&mut self, field: &str) -> Result<Value> {
        self.data.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.contains(field)
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys()
    }

    /// Write the full field map back to the server.
    pub fn save(&self) -> Result<&Self> {
        let url = self.database.endpoint(Endpoint::Documents {
            db: self.database.name(),
        });
        let response = self.database.session().put(&url, &self.data.to_json())?;

        if response.status != 200 {
            return Err(response.into_error());
        }
        Ok(self)
    }

    /// Point `field` at `target`.
    ///
    /// With `multiple`, a list-valued field gains the RID unless it already
    /// holds it; a field that is absent or not a list is left alone. Without
    /// `multiple`, the field is overwritten with the RID. Nothing is sent to
    /// the server.
    pub fn relate(&mut self, field: &str, target: RelateTarget<'_>, multiple: bool) -> Result<&mut Self> {
        let rid = match target {
            RelateTarget::Document(document) => document.reference(),
            RelateTarget::Rid(rid) => rid.to_owned(),
        };
        let rid = Value::String(rid);

        if multiple {
            if let Ok(Value::Array(ids)) = self.data.get(field) {
                if !ids.contains(&rid) {
                    let mut ids = ids.clone();
                    ids.push(rid);
                    self.data.set(field, Value::Array(ids))?;
                }
            }
        } else {
            self.data.set(field, rid)?;
        }
        Ok(self)
    }

    /// Delete the record server-side.
    pub fn delete(self) -> Result<()> {
        let url = self.database.endpoint(Endpoint::Document {
            db: self.database.name(),
            rid: self.rid.as_str(),
        });
        let response = self.database.session().delete(&url)?;

        if response.status != 204 {
            return Err(response.into_error());
        }
        info!(db = %self.database.name(), rid = %self.rid, "Deleted document");
        Ok(())
    }
}
