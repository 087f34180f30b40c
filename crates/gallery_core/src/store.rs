use std::collections::HashMap;

use serde_json::Value;

/// Last-known-good JSON value per response key.
///
/// Entries are replaced whole on every write and never removed; a missing
/// key means the domain has not been loaded yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseStore {
    entries: HashMap<String, Value>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
