//! JSON request boundary over the store.
//!
//! Each handler takes a deserialized request, runs one store operation under
//! the appropriate lock, and returns an [`ApiResponse`] carrying an HTTP
//! status code and a JSON body. Transport (routing, query-string decoding,
//! the HTTP server itself) is left to the embedding application.
//!
//! | Handler | Route |
//! |---|---|
//! | [`tree`] | `GET /api/tree` |
//! | [`list_values`] | `GET /api/values?path=P` |
//! | [`create_key`] / [`delete_key`] | `POST` / `DELETE /api/keys` |
//! | [`set_value`] / [`delete_value`] | `POST` / `DELETE /api/values` |
//! | [`rename`] | `PUT /api/rename` |
//! | [`search`] | `GET /api/search?query=Q&path=P&recursive=B` |

use crate::error::{ErrorKind, RegistryError, Result};
use crate::store::RegistryStore;
use crate::value::{Value, ValueData, ValueType};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Cloneable handle to a store guarded by a read/write lock.
///
/// Queries take the read lock and may run together; mutations take the
/// write lock and run alone.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<RegistryStore>>,
}

impl SharedStore {
    /// Wraps a store for shared use.
    pub fn new(store: RegistryStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Acquires the read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, RegistryStore> {
        // Store operations validate before mutating; a poisoned tree is intact.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, RegistryStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Status code and JSON body produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body.
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }

    fn message(message: impl Into<String>) -> Self {
        Self::ok(json!({ "message": message.into() }))
    }

    fn error(status: u16, err: &RegistryError) -> Self {
        debug!(status, error = %err, "Request failed");
        Self {
            status,
            body: json!({ "error": err.to_string() }),
        }
    }

    /// Maps a failure of a mutating request. These always answer 400.
    fn rejected(err: RegistryError) -> Self {
        Self::error(400, &err)
    }

    /// Maps a failure of a lookup request: 404 for not-found, else 400.
    fn lookup_failed(err: RegistryError) -> Self {
        let status = match err.kind() {
            ErrorKind::NotFound => 404,
            _ => 400,
        };
        Self::error(status, &err)
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of `POST /api/keys`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateKeyRequest {
    /// Parent path; absent means the root.
    #[serde(default)]
    pub path: String,
    /// New key name.
    pub name: Option<String>,
}

/// Body of `DELETE /api/keys`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteKeyRequest {
    /// Path of the key to delete.
    #[serde(default)]
    pub path: String,
}

/// Body of `POST /api/values`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetValueRequest {
    /// Key path.
    #[serde(default)]
    pub path: String,
    /// Value name.
    pub name: Option<String>,
    /// Type label such as `REG_SZ`.
    #[serde(rename = "type")]
    pub value_type: Option<String>,
    /// Payload, stored verbatim.
    pub data: Option<ValueData>,
}

/// Body of `DELETE /api/values`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteValueRequest {
    /// Key path.
    #[serde(default)]
    pub path: String,
    /// Value name.
    pub name: Option<String>,
}

/// What a rename request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameTarget {
    /// Rename the key at `path`.
    Key,
    /// Rename the value `old_name` inside the key at `path`.
    Value,
}

/// Body of `PUT /api/rename`.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    /// Key path.
    #[serde(default)]
    pub path: String,
    /// Whether a key or a value is renamed.
    #[serde(rename = "type")]
    pub target: Option<RenameTarget>,
    /// New name.
    pub new_name: Option<String>,
    /// Current value name, for value renames.
    pub old_name: Option<String>,
}

/// Query of `GET /api/values`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValuesQuery {
    /// Key path; absent means the root.
    #[serde(default)]
    pub path: String,
}

/// Query of `GET /api/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Search text.
    #[serde(default)]
    pub query: String,
    /// Start path; absent means the root.
    #[serde(default)]
    pub path: String,
    /// Whether to descend into subkeys. Accepts booleans or `"true"`/`"false"`.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub recursive: bool,
}

fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrText {
        Bool(bool),
        Text(String),
    }

    Ok(match BoolOrText::deserialize(deserializer)? {
        BoolOrText::Bool(b) => b,
        BoolOrText::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
    })
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    match field {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(RegistryError::missing_field(name)),
    }
}

/// `GET /api/tree`: the full key-name hierarchy.
pub fn tree(store: &SharedStore) -> ApiResponse {
    let snapshot = store.read().snapshot_tree();
    ApiResponse::ok(json!(snapshot))
}

/// `GET /api/values`: values of one key.
pub fn list_values(store: &SharedStore, query: ValuesQuery) -> ApiResponse {
    match store.read().list_values(&query.path) {
        Ok(values) => ApiResponse::ok(json!({ "values": values, "path": query.path })),
        Err(err) => ApiResponse::lookup_failed(err),
    }
}

/// `POST /api/keys`: create a subkey.
pub fn create_key(store: &SharedStore, request: CreateKeyRequest) -> ApiResponse {
    let result = required(request.name, "name").and_then(|name| {
        store.write().create_key(&request.path, &name)?;
        Ok(name)
    });
    match result {
        Ok(name) => ApiResponse::message(format!("Key '{}' created", name)),
        Err(err) => ApiResponse::rejected(err),
    }
}

/// `DELETE /api/keys`: delete a key and its subtree.
pub fn delete_key(store: &SharedStore, request: DeleteKeyRequest) -> ApiResponse {
    match store.write().delete_key(&request.path) {
        Ok(()) => ApiResponse::message("Key deleted"),
        Err(err) => ApiResponse::rejected(err),
    }
}

/// `POST /api/values`: create or update a value.
pub fn set_value(store: &SharedStore, request: SetValueRequest) -> ApiResponse {
    let result = (|| {
        let name = required(request.name, "name")?;
        let value_type = ValueType::from_name(&required(request.value_type, "type")?)?;
        let data = request.data.ok_or_else(|| RegistryError::missing_field("data"))?;
        let previous = store
            .write()
            .set_value(&request.path, &name, Value::new(value_type, data))?;
        Ok::<_, RegistryError>((name, previous.is_some()))
    })();
    match result {
        Ok((name, true)) => ApiResponse::message(format!("Value '{}' updated", name)),
        Ok((name, false)) => ApiResponse::message(format!("Value '{}' created", name)),
        Err(err) => ApiResponse::rejected(err),
    }
}

/// `DELETE /api/values`: delete a value.
pub fn delete_value(store: &SharedStore, request: DeleteValueRequest) -> ApiResponse {
    let result = required(request.name, "name")
        .and_then(|name| store.write().delete_value(&request.path, &name));
    match result {
        Ok(_) => ApiResponse::message("Value deleted"),
        Err(err) => ApiResponse::rejected(err),
    }
}

/// `PUT /api/rename`: rename a key or a value.
///
/// Key renames answer with the key's new path in `new_path`.
pub fn rename(store: &SharedStore, request: RenameRequest) -> ApiResponse {
    let new_name = match required(request.new_name, "new_name") {
        Ok(name) => name,
        Err(err) => return ApiResponse::rejected(err),
    };

    match request.target {
        Some(RenameTarget::Key) => match store.write().rename_key(&request.path, &new_name) {
            Ok(new_path) => ApiResponse::ok(json!({
                "success": true,
                "message": "Key renamed",
                "new_path": new_path,
            })),
            Err(err) => ApiResponse::rejected(err),
        },
        Some(RenameTarget::Value) => {
            let result = required(request.old_name, "old_name").and_then(|old_name| {
                store
                    .write()
                    .rename_value(&request.path, &old_name, &new_name)
            });
            match result {
                Ok(()) => ApiResponse::ok(json!({
                    "success": true,
                    "message": "Value renamed",
                })),
                Err(err) => ApiResponse::rejected(err),
            }
        }
        None => ApiResponse::rejected(RegistryError::missing_field("type")),
    }
}

/// `GET /api/search`: search values below a key.
///
/// An empty query answers `[]` without touching the store.
pub fn search(store: &SharedStore, query: SearchQuery) -> ApiResponse {
    if query.query.is_empty() {
        return ApiResponse::ok(json!([]));
    }
    let hits = store
        .read()
        .search(&query.path, &query.query, query.recursive);
    ApiResponse::ok(json!(hits))
}
