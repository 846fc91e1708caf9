//! Field collections for log entries.
//!
//! [`FieldMap`] wraps an [`IndexMap`] so that iteration follows insertion
//! order. Field order carries no meaning in a log entry, but a stable order
//! means the same map always serializes the same way, and a key that is
//! overwritten keeps its original position.
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{FieldMap, Value};
//!
//! let mut fields = FieldMap::new();
//! fields.insert("service", "payments");
//! fields.insert("attempt", 3);
//!
//! assert_eq!(fields.len(), 2);
//! assert_eq!(fields.get("service").and_then(Value::as_str), Some("payments"));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An insertion-ordered map of field names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap(IndexMap<String, Value>);

impl FieldMap {
    /// Creates an empty `FieldMap`.
    #[must_use]
    pub fn new() -> Self {
        FieldMap(IndexMap::new())
    }

    /// Creates an empty `FieldMap` with room for `capacity` fields.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        FieldMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field, returning the previous value for the key if any.
    ///
    /// The key is stored as given; use [`merge`](crate::merge) to normalize
    /// keys on the way in.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_logger::FieldMap;
    ///
    /// let mut map = FieldMap::new();
    /// assert!(map.insert("key", 42).is_none());
    /// assert!(map.insert("key", 43).is_some());
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes every field but keeps the allocated capacity.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    /// Returns the field at position `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&str, &Value)> {
        self.0
            .get_index(index)
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the fields of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for FieldMap {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl From<FieldMap> for HashMap<String, Value> {
    fn from(map: FieldMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for FieldMap {
    fn from(fields: [(K, V); N]) -> Self {
        fields.into_iter().collect()
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        FieldMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for FieldMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut map = FieldMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn test_from_array_and_hashmap() {
        let map = FieldMap::from([("x", 1), ("y", 2)]);
        assert_eq!(map.len(), 2);

        let mut hash = HashMap::new();
        hash.insert("k".to_string(), "v");
        let map = FieldMap::from(hash);
        assert_eq!(map.get("k").and_then(Value::as_str), Some("v"));
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut map = FieldMap::with_capacity(16);
        map.insert("a", 1);
        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map = FieldMap::from([("a", 1), ("b", 2), ("c", 3)]);
        map.remove("b");
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_get_index_follows_insertion_order() {
        let map = FieldMap::from([("b", 1), ("a", 2)]);
        assert_eq!(map.get_index(0), Some(("b", &Value::from(1))));
        assert_eq!(map.get_index(1), Some(("a", &Value::from(2))));
        assert_eq!(map.get_index(2), None);
    }
}
