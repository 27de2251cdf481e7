// SPDX-License-Identifier: PMPL-1.0-or-later

//! Read-only storage cluster metadata.

use serde_json::Value;

use crate::database::Database;
use crate::error::Result;
use crate::resource::ResourceObject;

/// Metadata of the storage cluster backing a class.
#[derive(Debug, Clone)]
pub struct Cluster {
    database: Database,
    data: ResourceObject,
}

impl Cluster {
    pub(crate) fn new(database: Database, data: Value) -> Self {
        Self {
            database,
            data: ResourceObject::from_json(data, &[]),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn data(&self) -> &ResourceObject {
        &self.data
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains(key)
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys()
    }
}
