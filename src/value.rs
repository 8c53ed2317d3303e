//! Registry values: type labels and payloads.

use crate::error::{RegistryError, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// String.
    #[cfg_attr(feature = "serde", serde(rename = "REG_SZ"))]
    String,

    /// 32-bit integer.
    #[cfg_attr(feature = "serde", serde(rename = "REG_DWORD"))]
    Dword,

    /// Multiple strings.
    #[cfg_attr(feature = "serde", serde(rename = "REG_MULTI_SZ"))]
    MultiString,

    /// Binary data, carried as hex text.
    #[cfg_attr(feature = "serde", serde(rename = "REG_BINARY"))]
    Binary,
}

impl ValueType {
    /// All supported value types.
    pub const ALL: [ValueType; 4] = [
        ValueType::String,
        ValueType::Dword,
        ValueType::MultiString,
        ValueType::Binary,
    ];

    /// Parses a value type from its registry name (e.g. `REG_SZ`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "REG_SZ" => Ok(ValueType::String),
            "REG_DWORD" => Ok(ValueType::Dword),
            "REG_MULTI_SZ" => Ok(ValueType::MultiString),
            "REG_BINARY" => Ok(ValueType::Binary),
            _ => Err(RegistryError::InvalidValueType(name.to_string())),
        }
    }

    /// Returns the registry name of this value type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "REG_SZ",
            ValueType::Dword => "REG_DWORD",
            ValueType::MultiString => "REG_MULTI_SZ",
            ValueType::Binary => "REG_BINARY",
        }
    }

    /// Returns true if the payload of this type takes part in content search.
    ///
    /// Numeric and binary payloads are matched by value name only.
    pub fn is_textual(&self) -> bool {
        matches!(self, ValueType::String | ValueType::MultiString)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value payload as supplied by the caller.
///
/// The payload shape is not tied to the [`ValueType`] label; the store keeps
/// whatever it is given. With the `json` feature, JSON payloads that are not
/// an integer, a string or a list of strings are kept as [`ValueData::Raw`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ValueData {
    /// Integer payload.
    Integer(i64),

    /// Text payload.
    Text(String),

    /// Ordered list of strings.
    List(Vec<String>),

    /// Any other JSON payload, kept as received.
    #[cfg(feature = "json")]
    Raw(serde_json::Value),
}

impl ValueData {
    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ValueData::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ValueData::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ValueData::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::Integer(n) => write!(f, "{}", n),
            ValueData::Text(s) => f.write_str(s),
            ValueData::List(items) => f.write_str(&items.join(", ")),
            #[cfg(feature = "json")]
            ValueData::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<&str> for ValueData {
    fn from(s: &str) -> Self {
        ValueData::Text(s.to_string())
    }
}

impl From<String> for ValueData {
    fn from(s: String) -> Self {
        ValueData::Text(s)
    }
}

impl From<i64> for ValueData {
    fn from(n: i64) -> Self {
        ValueData::Integer(n)
    }
}

impl From<u32> for ValueData {
    fn from(n: u32) -> Self {
        ValueData::Integer(i64::from(n))
    }
}

impl From<Vec<String>> for ValueData {
    fn from(items: Vec<String>) -> Self {
        ValueData::List(items)
    }
}

/// A typed value stored in a key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Value {
    /// Type label.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub value_type: ValueType,

    /// Payload.
    pub data: ValueData,
}

impl Value {
    /// Creates a new value.
    pub fn new(value_type: ValueType, data: impl Into<ValueData>) -> Self {
        Self {
            value_type,
            data: data.into(),
        }
    }

    /// Returns the text that content search looks at, if this value's type
    /// allows content matching.
    pub fn searchable_text(&self) -> Option<String> {
        if self.value_type.is_textual() {
            Some(self.data.to_string())
        } else {
            None
        }
    }

    /// Decodes a hex text payload into raw bytes.
    ///
    /// Whitespace between hex digits is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidBinary`] if the payload is not text or
    /// is not valid hexadecimal.
    pub fn binary_bytes(&self) -> Result<Vec<u8>> {
        let text = self.data.as_text().ok_or_else(|| {
            RegistryError::InvalidBinary(format!("expected hex text, found {}", self.data))
        })?;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(&compact).map_err(|e| RegistryError::InvalidBinary(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_names() {
        for value_type in ValueType::ALL {
            assert_eq!(ValueType::from_name(value_type.name()).unwrap(), value_type);
        }
        assert!(ValueType::from_name("REG_QWORD").is_err());
    }

    #[test]
    fn test_textual_types() {
        assert!(ValueType::String.is_textual());
        assert!(ValueType::MultiString.is_textual());
        assert!(!ValueType::Dword.is_textual());
        assert!(!ValueType::Binary.is_textual());
    }

    #[test]
    fn test_data_display() {
        assert_eq!(ValueData::Integer(42).to_string(), "42");
        assert_eq!(ValueData::from("abc").to_string(), "abc");
        assert_eq!(
            ValueData::List(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
    }

    #[test]
    fn test_searchable_text_is_type_gated() {
        assert_eq!(Value::new(ValueType::Dword, 42u32).searchable_text(), None);
        assert_eq!(
            Value::new(ValueType::String, "Count42").searchable_text(),
            Some("Count42".to_string())
        );
        // The label decides, not the payload shape.
        assert_eq!(Value::new(ValueType::Binary, "abc").searchable_text(), None);
    }

    #[test]
    fn test_binary_bytes() {
        let value = Value::new(ValueType::Binary, "DE AD be ef");
        assert_eq!(value.binary_bytes().unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);

        assert!(Value::new(ValueType::Binary, "XYZ").binary_bytes().is_err());
        assert!(Value::new(ValueType::Binary, 7i64).binary_bytes().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_value_json_shape() {
        let value = Value::new(ValueType::MultiString, vec!["x".to_string()]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"type": "REG_MULTI_SZ", "data": ["x"]}));

        let parsed: Value =
            serde_json::from_value(serde_json::json!({"type": "REG_DWORD", "data": 1})).unwrap();
        assert_eq!(parsed, Value::new(ValueType::Dword, 1i64));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_other_json_payloads_kept_verbatim() {
        for data in [
            serde_json::json!(1.5),
            serde_json::json!(true),
            serde_json::json!(["a", 1]),
            serde_json::json!({"k": "v"}),
        ] {
            let parsed: Value = serde_json::from_value(
                serde_json::json!({"type": "REG_SZ", "data": data.clone()}),
            )
            .unwrap();
            assert_eq!(parsed.data, ValueData::Raw(data.clone()));
            assert_eq!(serde_json::to_value(&parsed.data).unwrap(), data);
        }
    }
}
