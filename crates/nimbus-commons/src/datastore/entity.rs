//! Datastore entities: a key plus named properties.

use crate::datastore::key::Key;
use crate::datastore::value::DsValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored entity.
///
/// Properties are a flat name-to-value map; nested structures are flattened
/// to JSON strings by the column-type adapter before they get here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    key: Key,
    properties: BTreeMap<String, DsValue>,
}

impl Entity {
    /// Creates an entity with no properties.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Sets a property, replacing any previous value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: DsValue) {
        self.properties.insert(name.into(), value);
    }

    /// Builder-style variant of [`Entity::set`].
    pub fn with(mut self, name: impl Into<String>, value: DsValue) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the property value, or `None` when the property was omitted.
    /// An explicitly stored null returns `Some(&DsValue::Null)`.
    pub fn get(&self, name: &str) -> Option<&DsValue> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &BTreeMap<String, DsValue> {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;
    use crate::record_id::RecordId;
    use crate::tenant::Namespace;

    fn key() -> Key {
        Key::new(
            Namespace::default_namespace(),
            Kind::new("example.Task").unwrap(),
            RecordId::new("t-1"),
        )
    }

    #[test]
    fn test_explicit_null_differs_from_omission() {
        let entity = Entity::new(key()).with("done", DsValue::Null);
        assert_eq!(entity.get("done"), Some(&DsValue::Null));
        assert_eq!(entity.get("missing"), None);
    }

    #[test]
    fn test_set_replaces() {
        let mut entity = Entity::new(key());
        entity.set("count", DsValue::Integer(1));
        entity.set("count", DsValue::Integer(2));
        assert_eq!(entity.get("count"), Some(&DsValue::Integer(2)));
    }
}
