//! Error types for registry store operations.
//!
//! Every expected failure of a store operation is reported through
//! [`RegistryError`]. Callers that only care about the broad category (for
//! example to pick an HTTP status) use [`RegistryError::kind`].

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Broad failure categories shared by all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path or name does not resolve.
    NotFound,

    /// A name collides with an existing sibling.
    Conflict,

    /// The operation targets a protected top-level key.
    Rejected,

    /// A required input is missing or malformed.
    InvalidInput,
}

/// Errors that can occur while editing or querying the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The addressed key does not exist.
    #[error("Key not found: {path}")]
    KeyNotFound {
        /// Path that failed to resolve.
        path: String,
    },

    /// The parent of the addressed key does not exist.
    #[error("Parent key not found: {path}")]
    ParentNotFound {
        /// Parent path that failed to resolve.
        path: String,
    },

    /// The named value does not exist in the key.
    #[error("Value '{name}' not found in key: {path}")]
    ValueNotFound {
        /// Key path that was searched.
        path: String,
        /// Missing value name.
        name: String,
    },

    /// A sibling key with the same name already exists.
    #[error("Key '{name}' already exists")]
    KeyExists {
        /// Colliding key name.
        name: String,
    },

    /// A value with the same name already exists in the key.
    #[error("Value '{name}' already exists")]
    ValueExists {
        /// Colliding value name.
        name: String,
    },

    /// Top-level keys cannot be deleted or renamed.
    #[error("Cannot delete or rename root hive key: {path}")]
    ProtectedKey {
        /// Offending path.
        path: String,
    },

    /// Unknown value type label.
    #[error("Invalid value type: {0}")]
    InvalidValueType(String),

    /// Binary payload is not valid hexadecimal text.
    #[error("Invalid binary data: {0}")]
    InvalidBinary(String),

    /// A required field was missing or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RegistryError {
    /// Creates a key-not-found error for `path`.
    pub fn key_not_found(path: &str) -> Self {
        Self::KeyNotFound {
            path: path.to_string(),
        }
    }

    /// Creates a value-not-found error.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the key that was searched
    /// * `name` - Name of the value that wasn't found
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use regedit_store::error::RegistryError;
    /// let err = RegistryError::value_not_found("HKEY_CURRENT_USER\\Software", "Missing");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Value 'Missing' not found in key: HKEY_CURRENT_USER\\Software"
    /// );
    /// ```
    pub fn value_not_found(path: &str, name: &str) -> Self {
        Self::ValueNotFound {
            path: path.to_string(),
            name: name.to_string(),
        }
    }

    /// Creates an invalid input error for a missing field.
    pub fn missing_field(field: &str) -> Self {
        Self::InvalidInput(format!("Missing required field '{}'", field))
    }

    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound { .. } | Self::ParentNotFound { .. } | Self::ValueNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::KeyExists { .. } | Self::ValueExists { .. } => ErrorKind::Conflict,
            Self::ProtectedKey { .. } => ErrorKind::Rejected,
            Self::InvalidValueType(_) | Self::InvalidBinary(_) | Self::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
        }
    }

    /// Returns true if this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RegistryError::key_not_found("A").kind(), ErrorKind::NotFound);
        assert_eq!(
            RegistryError::ParentNotFound { path: "A".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistryError::KeyExists { name: "B".into() }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            RegistryError::ProtectedKey { path: "A".into() }.kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            RegistryError::missing_field("path").kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RegistryError::key_not_found("HKEY_LOCAL_MACHINE\\Nope").to_string(),
            "Key not found: HKEY_LOCAL_MACHINE\\Nope"
        );
        assert_eq!(
            RegistryError::missing_field("name").to_string(),
            "Invalid input: Missing required field 'name'"
        );
    }
}
