// SPDX-License-Identifier: PMPL-1.0-or-later

//! Schema properties of a class.
//!
//! Creating a property does not hand back a property object. The server is
//! asked to create it, the owning database is reloaded, and the reload
//! callback rebuilds the class schema from the fresh metadata. Properties
//! built from reported metadata are inert.

use serde_json::{Map, Value};
use tracing::info;

use crate::database::{Database, Reloaded};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::resource::ResourceObject;

/// One schema property of a class.
#[derive(Debug, Clone)]
pub struct KlassProperty {
    name: String,
    class_name: String,
    database: Database,
    data: ResourceObject,
}

impl KlassProperty {
    /// Wrap a property descriptor reported by the server.
    pub(crate) fn from_server(database: Database, class_name: &str, name: &str, data: Value) -> Self {
        Self {
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            database,
            data: ResourceObject::from_json(data, &[]),
        }
    }

    /// Create property `name` on `class_name`, then reload `database` and
    /// pass the fresh metadata to `on_reload`.
    ///
    /// `on_reload` only runs once both the create (201) and the reload have
    /// succeeded.
    pub fn create<T, F>(database: &Database, class_name: &str, name: &str, on_reload: F) -> Result<T>
    where
        F: FnOnce(&Reloaded) -> Result<T>,
    {
        let url = database.endpoint(Endpoint::Property {
            db: database.name(),
            class: class_name,
            property: name,
        });
        let response = database.session().post(&url, &Value::Object(Map::new()))?;

        if response.status != 201 {
            return Err(response.into_error());
        }

        info!(db = %database.name(), class = class_name, property = name, "Created property");
        database.reload_with(on_reload)
    }

    /// Drop the property server-side. The caller removes it from the schema.
    pub fn delete(&self) -> Result<()> {
        let url = self.database.endpoint(Endpoint::Property {
            db: self.database.name(),
            class: &self.class_name,
            property: &self.name,
        });
        let response = self.database.session().delete(&url)?;

        if response.status != 204 {
            return Err(response.into_error());
        }

        info!(db = %self.database.name(), class = %self.class_name, property = %self.name, "Dropped property");
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Descriptor reported by the server (type, constraints, ...).
    pub fn data(&self) -> &ResourceObject {
        &self.data
    }

    /// Reported property type, e.g. `STRING`.
    pub fn property_type(&self) -> Option<&str> {
        self.data.get("type").ok().and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::{open_database, BASE};
    use crate::mock::MockConnector;
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn test_create_rejected_skips_reload() {
        let mock = MockConnector::new();
        let database = open_database(&mock, json!({}));
        mock.respond(Method::Post, &format!("{BASE}/property/demo/Person/age"), 500, "no such class");

        let mut reloaded = false;
        let err = KlassProperty::create(&database, "Person", "age", |_| {
            reloaded = true;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.body(), Some("no such class"));
        assert!(!reloaded);
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_create_reloads_database() {
        let mock = MockConnector::new();
        let database = open_database(&mock, json!({}));
        mock.respond(Method::Post, &format!("{BASE}/property/demo/Person/age"), 201, "1")
            .respond_json(Method::Get, &format!("{BASE}/database/demo"), 200, &json!({"classes": []}));

        let classes = KlassProperty::create(&database, "Person", "age", |r| Ok(r.classes().len())).unwrap();
        assert_eq!(classes, 0);
        assert_eq!(mock.pending(), 0);
    }

    #[test]
    fn test_reported_type() {
        let mock = MockConnector::new();
        let database = open_database(&mock, json!({}));
        let prop = KlassProperty::from_server(database, "Person", "age", json!({"name": "age", "type": "INTEGER"}));
        assert_eq!(prop.property_type(), Some("INTEGER"));
        assert_eq!(prop.class_name(), "Person");
    }

    #[test]
    fn test_delete_expects_204() {
        let mock = MockConnector::new();
        let database = open_database(&mock, json!({}));
        mock.respond(Method::Delete, &format!("{BASE}/property/demo/Person/age"), 200, "ok");

        let prop = KlassProperty::from_server(database, "Person", "age", Value::Null);
        assert_eq!(prop.delete().unwrap_err().status(), Some(200));
    }
}
