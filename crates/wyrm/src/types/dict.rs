use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::intern::StringId;
use crate::value::Value;

/// An insertion-ordered mapping of values to values.
///
/// Class namespaces, instance attributes, and frame locals are all dicts
/// keyed by interned strings, so name lookup is id comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dict {
    entries: IndexMap<Value, Value>,
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any existing value for the key. Insertion
    /// order of first occurrence is preserved.
    pub fn insert(&mut self, key: Value, value: Value) {
        self.entries.insert(key, value);
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries.get(key).copied()
    }

    /// Inserts under an interned-string key.
    pub fn insert_str(&mut self, key: StringId, value: Value) {
        self.insert(Value::Str(key), value);
    }

    /// Looks up an interned-string key.
    #[must_use]
    pub fn get_str(&self, key: StringId) -> Option<Value> {
        self.get(&Value::Str(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Value, Value)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
