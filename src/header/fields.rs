//! Ordered key/value store for catalog header fields.
//!
//! Keys are stored in an ordered map to preserve insertion order. Re-setting
//! an existing key updates its value where it already sits; a new key is
//! appended at the end.
//!
//! A key may be present with no value (see [`HeaderFields::declare`]). Such a
//! key keeps its position but is skipped when the store is encoded by
//! [`codec::encode`](crate::header::codec::encode).
//!
//! This store does not enforce any header semantics: which keys exist and what
//! their values look like is left to the caller.

use indexmap::IndexMap;

use crate::header::DEFAULT_KEYS;

#[derive(Debug, Clone, Default)]
pub struct HeaderFields {
    entries: IndexMap<String, Option<String>>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// A store declaring every well-known key, in canonical order, with no
    /// values yet.
    pub fn with_default_keys() -> Self {
        let mut fields = Self::new();
        for key in DEFAULT_KEYS {
            fields.declare(key);
        }
        fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        // IndexMap::insert keeps the slot of an existing key
        self.entries.insert(key.to_string(), Some(value.to_string()));
    }

    /// Record `key` without a value. Does nothing if the key already exists.
    pub fn declare(&mut self, key: &str) {
        self.entries.entry(key.to_string()).or_insert(None);
    }

    pub fn remove(&mut self, key: &str) {
        // shift_remove keeps the relative order of the remaining keys
        self.entries.shift_remove(key);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Every key, with or without a value, in store order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Key/value pairs that carry a value, in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// IndexMap equality ignores order, header equality does not.
impl PartialEq for HeaderFields {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for HeaderFields {}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.set(key.as_ref(), value.as_ref());
        }
        fields
    }
}
