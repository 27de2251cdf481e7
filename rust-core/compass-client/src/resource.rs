// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mapping-like container shared by every resource.
//!
//! [`ResourceObject`] holds a resource's data keyed by string and refuses to
//! set or delete keys declared immutable for that resource type. It performs
//! no I/O; the resource types wrapping it add identity and remote behaviour.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{CompassError, Result};

/// Keyed resource data with an immutable-key guard.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject<V = Value> {
    data: HashMap<String, V>,
    immutable: &'static [&'static str],
}

impl<V> Default for ResourceObject<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResourceObject<V> {
    /// Create an empty resource with no guarded keys.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            immutable: &[],
        }
    }

    /// Create an empty resource whose `immutable` keys cannot be set or
    /// deleted.
    pub fn guarded(immutable: &'static [&'static str]) -> Self {
        Self {
            data: HashMap::new(),
            immutable,
        }
    }

    /// Return the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<&V> {
        self.data
            .get(key)
            .ok_or_else(|| CompassError::KeyNotFound(key.to_owned()))
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        self.guard(key)?;
        self.data
            .get_mut(key)
            .ok_or_else(|| CompassError::KeyNotFound(key.to_owned()))
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        self.guard(&key)?;
        self.data.insert(key, value);
        Ok(())
    }

    /// Delete `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Result<V> {
        self.guard(key)?;
        self.data
            .remove(key)
            .ok_or_else(|| CompassError::KeyNotFound(key.to_owned()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.data.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether `key` is declared immutable for this resource.
    pub fn is_immutable(&self, key: &str) -> bool {
        self.immutable.iter().any(|guarded| *guarded == key)
    }

    /// Swap in a whole new data set. Used when the server hands back a fresh
    /// copy of the resource, so the per-key guard does not apply.
    pub fn replace(&mut self, data: HashMap<String, V>) {
        self.data = data;
    }

    /// Drop every entry. Guarded keys go too: this is a cache reset, not an
    /// edit.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Insert without consulting the guard. Only for populating a resource
    /// from server data.
    pub(crate) fn insert_raw(&mut self, key: String, value: V) {
        self.data.insert(key, value);
    }

    fn guard(&self, key: &str) -> Result<()> {
        if self.is_immutable(key) {
            return Err(CompassError::ImmutableKey(key.to_owned()));
        }
        Ok(())
    }
}

impl ResourceObject<Value> {
    /// Build a resource from a JSON object. Anything other than an object
    /// yields an empty resource.
    pub fn from_json(value: Value, immutable: &'static [&'static str]) -> Self {
        let mut resource = Self::guarded(immutable);
        resource.replace_json(value);
        resource
    }

    /// Replace the data with the entries of a JSON object.
    pub fn replace_json(&mut self, value: Value) {
        self.data = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
    }

    /// The data as a JSON object, e.g. for a request body.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(k, v)| (k.to_owned(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_like() -> ResourceObject {
        ResourceObject::from_json(json!({"@rid": "#1:0", "name": "a"}), &["@rid"])
    }

    #[test]
    fn test_get_missing_key() {
        let resource: ResourceObject = ResourceObject::new();
        assert!(matches!(
            resource.get("nope"),
            Err(CompassError::KeyNotFound(k)) if k == "nope"
        ));
    }

    #[test]
    fn test_set_and_read_back() {
        let mut resource = document_like();
        resource.set("name", json!("b")).unwrap();
        resource.set("age", json!(3)).unwrap();
        assert_eq!(resource.get("name").unwrap(), &json!("b"));
        assert_eq!(resource.get("age").unwrap(), &json!(3));
        assert_eq!(resource.size(), 3);
    }

    #[test]
    fn test_immutable_key_rejected() {
        let mut resource = document_like();
        assert!(matches!(
            resource.set("@rid", json!("#2:0")),
            Err(CompassError::ImmutableKey(_))
        ));
        assert!(matches!(
            resource.remove("@rid"),
            Err(CompassError::ImmutableKey(_))
        ));
        assert!(matches!(
            resource.get_mut("@rid"),
            Err(CompassError::ImmutableKey(_))
        ));
        assert_eq!(resource.get("@rid").unwrap(), &json!("#1:0"));
    }

    #[test]
    fn test_remove() {
        let mut resource = document_like();
        assert_eq!(resource.remove("name").unwrap(), json!("a"));
        assert!(!resource.contains("name"));
        assert!(matches!(
            resource.remove("name"),
            Err(CompassError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_non_object_json_is_empty() {
        let resource = ResourceObject::from_json(json!([1, 2]), &[]);
        assert!(resource.is_empty());
    }

    #[test]
    fn test_to_json() {
        let resource = document_like();
        assert_eq!(resource.to_json(), json!({"@rid": "#1:0", "name": "a"}));
    }

    #[test]
    fn test_iter_pairs_keys_with_values() {
        let resource = document_like();
        let mut pairs: Vec<(&str, &Value)> = resource.iter().collect();
        pairs.sort_by_key(|(key, _)| *key);
        assert_eq!(pairs, vec![("@rid", &json!("#1:0")), ("name", &json!("a"))]);
    }

    #[test]
    fn test_replace_bypasses_guard() {
        let mut resource = document_like();
        resource.replace_json(json!({"@rid": "#1:0", "other": true}));
        assert!(resource.contains("other"));
        assert!(!resource.contains("name"));
    }
}
