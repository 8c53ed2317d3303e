//! Registry key nodes and read-only tree snapshots.

use crate::value::Value;
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Name-addressed entries kept in insertion order.
///
/// Lookups are linear; keys in an interactive registry hold few children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<T> {
    items: Vec<(String, T)>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Entries<T> {
    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|(n, _)| n == name)
    }

    /// Returns the entry with the given name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the entry with the given name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Inserts an entry, overwriting in place if the name is taken.
    ///
    /// Returns the previous entry, if any.
    pub fn insert(&mut self, name: impl Into<String>, item: T) -> Option<T> {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.items[idx].1, item)),
            None => {
                self.items.push((name, item));
                None
            }
        }
    }

    /// Removes and returns the entry with the given name.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.position(name).map(|idx| self.items.remove(idx).1)
    }

    /// Iterates over `(name, entry)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterates over entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(n, _)| n.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A registry key.
///
/// A key does not know its own name or parent; it is addressed by its
/// position in the parent's subkey entries.
#[derive(Debug, Clone)]
pub struct Key {
    /// Child keys by name.
    pub subkeys: Entries<Key>,

    /// Values by name.
    pub values: Entries<Value>,

    /// Last time this key's own subkeys or values changed.
    pub last_written: DateTime<Utc>,
}

impl Default for Key {
    fn default() -> Self {
        Self::new()
    }
}

impl Key {
    /// Creates an empty key stamped with the current time.
    pub fn new() -> Self {
        Self {
            subkeys: Entries::default(),
            values: Entries::default(),
            last_written: Utc::now(),
        }
    }

    /// Returns true if the key has no subkeys and no values.
    pub fn is_empty(&self) -> bool {
        self.subkeys.is_empty() && self.values.is_empty()
    }

    /// Updates the last-written timestamp.
    pub fn touch(&mut self) {
        self.last_written = Utc::now();
    }

    /// Number of keys below this one.
    pub fn descendant_count(&self) -> usize {
        self.subkeys
            .iter()
            .map(|(_, key)| 1 + key.descendant_count())
            .sum()
    }

    /// Builds a name-only snapshot of this key and its descendants.
    pub fn snapshot(&self) -> KeyTree {
        KeyTree {
            children: self
                .subkeys
                .iter()
                .map(|(name, key)| (name.to_string(), key.snapshot()))
                .collect(),
        }
    }
}

/// Point-in-time projection of key names.
///
/// Serializes as nested JSON objects mapping each subkey name to its own
/// subtree, e.g. `{"HKEY_CURRENT_USER": {"Software": {}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTree {
    /// Child names and their subtrees, in insertion order.
    pub children: Vec<(String, KeyTree)>,
}

impl KeyTree {
    /// Returns the subtree for a direct child.
    pub fn child(&self, name: &str) -> Option<&KeyTree> {
        self.children.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Iterates over the direct child names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(n, _)| n.as_str())
    }

    /// Total number of keys below this node.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|(_, t)| 1 + t.descendant_count())
            .sum()
    }
}

#[cfg(feature = "serde")]
impl Serialize for KeyTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (name, subtree) in &self.children {
            map.serialize_entry(name, subtree)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut entries = Entries::default();
        entries.insert("b", 1);
        entries.insert("a", 2);
        entries.insert("c", 3);
        assert_eq!(entries.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);

        // Overwrite keeps the slot.
        assert_eq!(entries.insert("a", 20), Some(2));
        assert_eq!(entries.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(entries.get("a"), Some(&20));

        assert_eq!(entries.remove("b"), Some(1));
        assert_eq!(entries.remove("b"), None);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut entries = Entries::default();
        entries.insert("Software", 1);
        assert!(entries.contains("Software"));
        assert!(!entries.contains("SOFTWARE"));
    }

    #[test]
    fn test_snapshot_names_only() {
        let mut root = Key::new();
        let mut child = Key::new();
        child.subkeys.insert("Leaf", Key::new());
        child
            .values
            .insert("V", Value::new(ValueType::String, "x"));
        root.subkeys.insert("Child", child);

        let tree = root.snapshot();
        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["Child"]);
        assert_eq!(tree.child("Child").unwrap().names().collect::<Vec<_>>(), vec!["Leaf"]);
        assert_eq!(tree.descendant_count(), 2);
        assert_eq!(root.descendant_count(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut root = Key::new();
        root.subkeys.insert("A", Key::new());
        let tree = root.snapshot();
        root.subkeys.insert("B", Key::new());
        assert_eq!(tree.names().count(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tree_json_shape() {
        let mut root = Key::new();
        let mut hive = Key::new();
        hive.subkeys.insert("Software", Key::new());
        root.subkeys.insert("HKEY_CURRENT_USER", hive);
        let json = serde_json::to_value(root.snapshot()).unwrap();
        assert_eq!(json, serde_json::json!({"HKEY_CURRENT_USER": {"Software": {}}}));
    }
}
