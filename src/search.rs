//! Case-insensitive search over value names and textual payloads.

use crate::key::Key;
use crate::path::join_path;
use crate::value::{ValueData, ValueType};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A value matched by a search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SearchHit {
    /// Full path of the key holding the value.
    pub location: String,

    /// Value name.
    pub name: String,

    /// Value type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub value_type: ValueType,

    /// Value payload.
    pub data: ValueData,
}

/// Collects matching values under `key`, which lives at `location`.
///
/// `query_lower` must already be lower-cased. Keys are visited depth-first,
/// parents before children, siblings in insertion order.
pub(crate) fn collect_matches(
    key: &Key,
    location: &str,
    query_lower: &str,
    recursive: bool,
    hits: &mut Vec<SearchHit>,
) {
    for (name, value) in key.values.iter() {
        let name_match = name.to_lowercase().contains(query_lower);
        let data_match = || {
            value
                .searchable_text()
                .map(|text| text.to_lowercase().contains(query_lower))
                .unwrap_or(false)
        };

        if name_match || data_match() {
            hits.push(SearchHit {
                location: location.to_string(),
                name: name.to_string(),
                value_type: value.value_type,
                data: value.data.clone(),
            });
        }
    }

    if recursive {
        for (name, child) in key.subkeys.iter() {
            let child_location = join_path(location, name);
            collect_matches(child, &child_location, query_lower, true, hits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn sample() -> Key {
        let mut root = Key::new();
        let mut app = Key::new();
        app.values.insert("Count", Value::new(ValueType::Dword, 42u32));
        app.values.insert("Label", Value::new(ValueType::String, "Count42"));
        let mut nested = Key::new();
        nested
            .values
            .insert("Paths", Value::new(ValueType::MultiString, vec!["C:\\Apps".to_string()]));
        app.subkeys.insert("Nested", nested);
        root.subkeys.insert("App", app);
        root
    }

    fn search(key: &Key, query: &str, recursive: bool) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        collect_matches(key, "", &query.to_lowercase(), recursive, &mut hits);
        hits
    }

    #[test]
    fn test_dword_data_is_not_content_matched() {
        let hits = search(&sample(), "42", true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Label");
        assert_eq!(hits[0].location, "App");
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let hits = search(&sample(), "COUNT", true);
        let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Count", "Label"]);
    }

    #[test]
    fn test_multi_string_content_match() {
        let hits = search(&sample(), "c:\\apps", true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].location, "App\\Nested");
    }

    #[test]
    fn test_non_recursive_stays_on_start_key() {
        assert!(search(&sample(), "count", false).is_empty());
    }
}
