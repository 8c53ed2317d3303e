//! In-memory registry store.

use crate::error::{RegistryError, Result};
use crate::key::{Key, KeyTree};
use crate::path::{is_protected, join_path, normalize, parent_and_name, split_path};
use crate::search::{collect_matches, SearchHit};
use crate::value::{Value, ValueData, ValueType};
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

/// One value as listed for a key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ValueEntry {
    /// Value name.
    pub name: String,

    /// Value type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub value_type: ValueType,

    /// Value payload.
    pub data: ValueData,
}

/// Hierarchical registry store.
///
/// The store owns a synthetic, nameless root key. Keys are addressed by
/// backslash-separated paths walked from that root; the empty path is the
/// root itself.
///
/// The store has no internal synchronization. Share it between threads
/// through [`SharedStore`](crate::api::SharedStore) or an equivalent lock.
///
/// # Examples
///
/// ```
/// use regedit_store::{RegistryStore, Value, ValueType};
///
/// # fn main() -> regedit_store::Result<()> {
/// let mut store = RegistryStore::new();
/// store.create_key("HKEY_CURRENT_USER\\Software", "MyApp")?;
/// store.set_value(
///     "HKEY_CURRENT_USER\\Software\\MyApp",
///     "Version",
///     Value::new(ValueType::String, "2.1"),
/// )?;
///
/// let new_path = store.rename_key("HKEY_CURRENT_USER\\Software\\MyApp", "MyApp2")?;
/// assert_eq!(new_path, "HKEY_CURRENT_USER\\Software\\MyApp2");
/// assert_eq!(store.list_values(&new_path)?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegistryStore {
    root: Key,
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore {
    /// Creates a store seeded with the two hives and their default keys.
    ///
    /// ```text
    /// HKEY_LOCAL_MACHINE\SOFTWARE
    /// HKEY_LOCAL_MACHINE\SYSTEM
    /// HKEY_CURRENT_USER\Control Panel
    /// HKEY_CURRENT_USER\Software   Version = "1.0.0" (REG_SZ)
    ///                              Installed = 1 (REG_DWORD)
    /// ```
    pub fn new() -> Self {
        let mut hklm = Key::new();
        hklm.subkeys.insert("SOFTWARE", Key::new());
        hklm.subkeys.insert("SYSTEM", Key::new());

        let mut software = Key::new();
        software
            .values
            .insert("Version", Value::new(ValueType::String, "1.0.0"));
        software
            .values
            .insert("Installed", Value::new(ValueType::Dword, 1u32));

        let mut hkcu = Key::new();
        hkcu.subkeys.insert("Control Panel", Key::new());
        hkcu.subkeys.insert("Software", software);

        let mut root = Key::new();
        root.subkeys.insert("HKEY_LOCAL_MACHINE", hklm);
        root.subkeys.insert("HKEY_CURRENT_USER", hkcu);

        debug!("Seeded registry store");
        Self { root }
    }

    /// Creates a store with a bare root and no hives.
    pub fn empty() -> Self {
        Self { root: Key::new() }
    }

    /// Returns the root key.
    pub fn root(&self) -> &Key {
        &self.root
    }

    /// Resolves a path to its key.
    ///
    /// Empty segments are skipped. Returns `None` as soon as a segment is
    /// missing.
    pub fn resolve(&self, path: &str) -> Option<&Key> {
        split_path(path)
            .into_iter()
            .try_fold(&self.root, |key, segment| key.subkeys.get(segment))
    }

    fn resolve_mut(&mut self, path: &str) -> Option<&mut Key> {
        split_path(path)
            .into_iter()
            .try_fold(&mut self.root, |key, segment| key.subkeys.get_mut(segment))
    }

    fn require_key(&self, path: &str) -> Result<&Key> {
        self.resolve(path).ok_or_else(|| {
            debug!(path, "Key not found");
            RegistryError::key_not_found(path)
        })
    }

    fn require_key_mut(&mut self, path: &str) -> Result<&mut Key> {
        self.resolve_mut(path).ok_or_else(|| {
            debug!(path, "Key not found");
            RegistryError::key_not_found(path)
        })
    }

    /// Returns true if the path resolves.
    pub fn key_exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Returns a name-only snapshot of the whole tree.
    pub fn snapshot_tree(&self) -> KeyTree {
        self.root.snapshot()
    }

    /// Lists the values of a key in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::KeyNotFound`] if the path does not resolve.
    pub fn list_values(&self, path: &str) -> Result<Vec<ValueEntry>> {
        let key = self.require_key(path)?;
        Ok(key
            .values
            .iter()
            .map(|(name, value)| ValueEntry {
                name: name.to_string(),
                value_type: value.value_type,
                data: value.data.clone(),
            })
            .collect())
    }

    /// Returns a single value.
    pub fn get_value(&self, path: &str, name: &str) -> Result<&Value> {
        self.require_key(path)?
            .values
            .get(name)
            .ok_or_else(|| RegistryError::value_not_found(path, name))
    }

    /// Creates an empty subkey under `parent_path`.
    ///
    /// The name is taken verbatim; no character checks are made.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ParentNotFound`] if the parent does not resolve
    /// - [`RegistryError::KeyExists`] if the parent already has that subkey
    #[instrument(skip(self))]
    pub fn create_key(&mut self, parent_path: &str, name: &str) -> Result<()> {
        let parent = self
            .resolve_mut(parent_path)
            .ok_or_else(|| RegistryError::ParentNotFound {
                path: parent_path.to_string(),
            })?;

        if parent.subkeys.contains(name) {
            debug!("Subkey already exists");
            return Err(RegistryError::KeyExists {
                name: name.to_string(),
            });
        }

        parent.subkeys.insert(name, Key::new());
        parent.touch();
        info!("Created key");
        Ok(())
    }

    /// Deletes a key and its entire subtree.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ProtectedKey`] for the root and top-level keys
    /// - [`RegistryError::ParentNotFound`] / [`RegistryError::KeyNotFound`]
    ///   if the path does not resolve
    #[instrument(skip(self))]
    pub fn delete_key(&mut self, path: &str) -> Result<()> {
        let (parent_path, name) = protected_split(path)?;
        let parent = self
            .resolve_mut(&parent_path)
            .ok_or(RegistryError::ParentNotFound { path: parent_path })?;

        let removed = parent
            .subkeys
            .remove(name)
            .ok_or_else(|| RegistryError::key_not_found(path))?;
        parent.touch();

        info!(descendants = removed.descendant_count(), "Deleted key");
        Ok(())
    }

    /// Renames a key, keeping its subtree and values.
    ///
    /// Returns the new path of the key.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ProtectedKey`] for the root and top-level keys
    /// - [`RegistryError::ParentNotFound`] / [`RegistryError::KeyNotFound`]
    ///   if the path does not resolve
    /// - [`RegistryError::KeyExists`] if a sibling already has `new_name`
    #[instrument(skip(self))]
    pub fn rename_key(&mut self, path: &str, new_name: &str) -> Result<String> {
        let (parent_path, old_name) = protected_split(path)?;
        let new_path = join_path(&parent_path, new_name);
        let parent = self
            .resolve_mut(&parent_path)
            .ok_or(RegistryError::ParentNotFound { path: parent_path })?;

        if !parent.subkeys.contains(old_name) {
            return Err(RegistryError::key_not_found(path));
        }
        if parent.subkeys.contains(new_name) {
            return Err(RegistryError::KeyExists {
                name: new_name.to_string(),
            });
        }

        if let Some(key) = parent.subkeys.remove(old_name) {
            parent.subkeys.insert(new_name, key);
        }
        parent.touch();
        info!(new_path = %new_path, "Renamed key");
        Ok(new_path)
    }

    /// Creates or overwrites a value.
    ///
    /// Returns the previous value when one was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::KeyNotFound`] if the path does not resolve.
    #[instrument(skip(self, value), fields(value_type = %value.value_type))]
    pub fn set_value(&mut self, path: &str, name: &str, value: Value) -> Result<Option<Value>> {
        let key = self.require_key_mut(path)?;
        let previous = key.values.insert(name, value);
        key.touch();
        info!(replaced = previous.is_some(), "Set value");
        Ok(previous)
    }

    /// Deletes a value.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the key or the value does not exist.
    #[instrument(skip(self))]
    pub fn delete_value(&mut self, path: &str, name: &str) -> Result<Value> {
        let key = self.require_key_mut(path)?;
        let removed = key
            .values
            .remove(name)
            .ok_or_else(|| RegistryError::value_not_found(path, name))?;
        key.touch();
        info!("Deleted value");
        Ok(removed)
    }

    /// Renames a value, keeping its type and payload.
    ///
    /// # Errors
    ///
    /// - not-found if the key or `old_name` does not exist
    /// - [`RegistryError::ValueExists`] if `new_name` is already taken
    #[instrument(skip(self))]
    pub fn rename_value(&mut self, path: &str, old_name: &str, new_name: &str) -> Result<()> {
        let key = self.require_key_mut(path)?;
        if !key.values.contains(old_name) {
            return Err(RegistryError::value_not_found(path, old_name));
        }
        if key.values.contains(new_name) {
            return Err(RegistryError::ValueExists {
                name: new_name.to_string(),
            });
        }

        if let Some(value) = key.values.remove(old_name) {
            key.values.insert(new_name, value);
        }
        key.touch();
        info!("Renamed value");
        Ok(())
    }

    /// Searches value names and textual payloads for `query`.
    ///
    /// Matching is a case-insensitive substring test. Value names always take
    /// part; payloads only for `REG_SZ` and `REG_MULTI_SZ` values. With
    /// `recursive`, all descendants of the start key are searched as well.
    ///
    /// An empty `query` or an unresolved `start_path` yields no hits rather
    /// than an error.
    #[instrument(skip(self))]
    pub fn search(&self, start_path: &str, query: &str, recursive: bool) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        if query.is_empty() {
            return hits;
        }
        match self.resolve(start_path) {
            Some(start) => {
                let location = normalize(start_path);
                collect_matches(start, &location, &query.to_lowercase(), recursive, &mut hits);
            }
            None => debug!("Search start key not found"),
        }
        debug!(hits = hits.len(), "Search finished");
        hits
    }
}

/// Splits a delete/rename target into parent path and name, refusing
/// protected paths.
fn protected_split(path: &str) -> Result<(String, &str)> {
    match parent_and_name(path) {
        Some(split) if !is_protected(path) => Ok(split),
        _ => {
            warn!(path, "Refusing to modify protected key");
            Err(RegistryError::ProtectedKey {
                path: path.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_layout() {
        let store = RegistryStore::new();
        let tree = store.snapshot_tree();
        assert_eq!(
            tree.names().collect::<Vec<_>>(),
            vec!["HKEY_LOCAL_MACHINE", "HKEY_CURRENT_USER"]
        );
        assert_eq!(
            tree.child("HKEY_LOCAL_MACHINE").unwrap().names().collect::<Vec<_>>(),
            vec!["SOFTWARE", "SYSTEM"]
        );
        assert_eq!(
            tree.child("HKEY_CURRENT_USER").unwrap().names().collect::<Vec<_>>(),
            vec!["Control Panel", "Software"]
        );

        let values = store.list_values("HKEY_CURRENT_USER\\Software").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].name, "Version");
        assert_eq!(values[1].data, ValueData::Integer(1));
    }

    #[test]
    fn test_empty_store() {
        let store = RegistryStore::empty();
        assert!(store.root().is_empty());
        assert!(store.snapshot_tree().children.is_empty());
    }

    #[test]
    fn test_resolve() {
        let store = RegistryStore::new();
        assert!(store.resolve("").is_some());
        assert!(store.resolve("\\HKEY_CURRENT_USER\\\\Software\\").is_some());
        assert!(store.resolve("HKEY_CURRENT_USER\\Missing\\Software").is_none());
        assert!(store.resolve("hkey_current_user").is_none());
    }

    #[test]
    fn test_create_key_parent_missing() {
        let mut store = RegistryStore::new();
        let err = store.create_key("HKEY_NOPE", "A").unwrap_err();
        assert!(matches!(err, RegistryError::ParentNotFound { .. }));
    }

    #[test]
    fn test_create_top_level_key_under_root() {
        let mut store = RegistryStore::new();
        store.create_key("", "HKEY_USERS").unwrap();
        assert!(store.key_exists("HKEY_USERS"));
        // Top-level keys are protected once created.
        assert!(matches!(
            store.delete_key("HKEY_USERS"),
            Err(RegistryError::ProtectedKey { .. })
        ));
    }

    #[test]
    fn test_mutation_touches_last_written() {
        let mut store = RegistryStore::new();
        let before = store.resolve("HKEY_LOCAL_MACHINE").unwrap().last_written;
        store.create_key("HKEY_LOCAL_MACHINE", "HARDWARE").unwrap();
        let after = store.resolve("HKEY_LOCAL_MACHINE").unwrap().last_written;
        assert!(after >= before);
    }

    #[test]
    fn test_rename_key_moves_to_end() {
        let mut store = RegistryStore::new();
        store
            .rename_key("HKEY_LOCAL_MACHINE\\SOFTWARE", "SOFTWARE2")
            .unwrap();
        let tree = store.snapshot_tree();
        assert_eq!(
            tree.child("HKEY_LOCAL_MACHINE").unwrap().names().collect::<Vec<_>>(),
            vec!["SYSTEM", "SOFTWARE2"]
        );
    }

    #[test]
    fn test_rename_key_to_same_name_conflicts() {
        let mut store = RegistryStore::new();
        let err = store
            .rename_key("HKEY_LOCAL_MACHINE\\SOFTWARE", "SOFTWARE")
            .unwrap_err();
        assert!(matches!(err, RegistryError::KeyExists { .. }));
    }

    #[test]
    fn test_failed_operations_leave_tree_unchanged() {
        let mut store = RegistryStore::new();
        let before = store.snapshot_tree();
        assert!(store.create_key("HKEY_LOCAL_MACHINE", "SYSTEM").is_err());
        assert!(store.delete_key("HKEY_LOCAL_MACHINE\\NOPE").is_err());
        assert!(store
            .rename_key("HKEY_LOCAL_MACHINE\\SOFTWARE", "SYSTEM")
            .is_err());
        assert_eq!(store.snapshot_tree(), before);
    }

    #[test]
    fn test_value_operations() {
        let mut store = RegistryStore::new();
        let path = "HKEY_CURRENT_USER\\Software";

        let previous = store
            .set_value(path, "Version", Value::new(ValueType::String, "2.0"))
            .unwrap();
        assert_eq!(previous, Some(Value::new(ValueType::String, "1.0.0")));

        store.rename_value(path, "Version", "OldVersion").unwrap();
        assert!(store.get_value(path, "Version").is_err());
        assert_eq!(
            store.get_value(path, "OldVersion").unwrap().data,
            ValueData::from("2.0")
        );

        let err = store
            .rename_value(path, "OldVersion", "Installed")
            .unwrap_err();
        assert!(matches!(err, RegistryError::ValueExists { .. }));

        store.delete_value(path, "OldVersion").unwrap();
        assert!(store.delete_value(path, "OldVersion").unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_missing_start_is_empty() {
        let store = RegistryStore::new();
        assert!(store.search("HKEY_NOPE", "version", true).is_empty());
    }

    #[test]
    fn test_search_reports_full_location() {
        let store = RegistryStore::new();
        let hits = store.search("\\HKEY_CURRENT_USER\\", "VERSION", true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].location, "HKEY_CURRENT_USER\\Software");
    }
}
