//! # Registry Store
//!
//! An in-memory, hierarchical key/value store modeled on the Windows
//! registry, built to back a browser-based registry editor.
//!
//! ## Features
//!
//! - **Tree of keys**: named keys nested under a synthetic root, each holding
//!   subkeys and typed values
//! - **Typed values**: `REG_SZ`, `REG_DWORD`, `REG_MULTI_SZ` and `REG_BINARY`
//!   labels with payloads stored verbatim
//! - **Editing**: create, delete and rename keys; set, delete and rename values
//! - **Search**: case-insensitive search over value names and textual payloads
//! - **Protected hives**: top-level keys cannot be deleted or renamed
//!
//! ## Layout
//!
//! ```text
//! (root)
//!   HKEY_LOCAL_MACHINE
//!     SOFTWARE
//!     SYSTEM
//!   HKEY_CURRENT_USER
//!     Control Panel
//!     Software          Version = "1.0.0", Installed = 1
//! ```
//!
//! Paths join key names with a backslash (`HKEY_CURRENT_USER\Software`); the
//! empty path is the root.
//!
//! ## Examples
//!
//! ```
//! use regedit_store::{RegistryStore, Value, ValueType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = RegistryStore::new();
//! store.create_key("HKEY_CURRENT_USER\\Software", "MyApp")?;
//! store.set_value(
//!     "HKEY_CURRENT_USER\\Software\\MyApp",
//!     "Paths",
//!     Value::new(ValueType::MultiString, vec!["C:\\Apps".to_string()]),
//! )?;
//!
//! for hit in store.search("", "apps", true) {
//!     println!("{}: {} = {}", hit.location, hit.name, hit.data);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cargo features
//!
//! - `json` (default): serde support and the [`api`] request boundary
//! - `python`: PyO3 bindings

#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "json")]
pub mod api;
pub mod error;
pub mod key;
pub mod path;
pub mod search;
pub mod store;
pub mod value;

// Python bindings (only compiled when python feature is enabled)
#[cfg(feature = "python")]
pub mod python;

// Re-export main types for convenience
#[cfg(feature = "json")]
pub use api::{ApiResponse, SharedStore};
pub use error::{ErrorKind, RegistryError, Result};
pub use key::{Key, KeyTree};
pub use path::SEPARATOR;
pub use search::SearchHit;
pub use store::{RegistryStore, ValueEntry};
pub use value::{Value, ValueData, ValueType};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
