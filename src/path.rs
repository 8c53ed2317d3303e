//! Path helpers for addressing keys.
//!
//! A path is a sequence of key names joined by a backslash. Empty segments
//! are discarded when splitting, so `\A\\B\` and `A\B` address the same
//! key, and the empty string addresses the root.

/// Separator between key names in a path.
pub const SEPARATOR: char = '\\';

const SEPARATOR_STR: &str = "\\";

/// Names of the hive keys created at construction.
pub const HIVE_NAMES: [&str; 2] = ["HKEY_LOCAL_MACHINE", "HKEY_CURRENT_USER"];

/// Splits a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Joins a parent path and a child name.
///
/// An empty parent yields the bare name.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// Splits a path into its normalized parent path and final segment.
///
/// Returns `None` for paths with no segments (the root).
pub fn parent_and_name(path: &str) -> Option<(String, &str)> {
    let segments = split_path(path);
    let (name, parent) = segments.split_last()?;
    Some((parent.join(SEPARATOR_STR), *name))
}

/// Rebuilds a path from its non-empty segments.
pub fn normalize(path: &str) -> String {
    split_path(path).join(SEPARATOR_STR)
}

/// Returns true if the path may not be deleted or renamed.
///
/// Anything that is not at least two segments deep is protected, which covers
/// the root and every top-level key, not only the seeded hives.
pub fn is_protected(path: &str) -> bool {
    split_path(path).len() < 2 || HIVE_NAMES.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_discards_empty_segments() {
        assert_eq!(split_path(""), Vec::<&str>::new());
        assert_eq!(split_path("\\\\"), Vec::<&str>::new());
        assert_eq!(
            split_path("\\HKEY_CURRENT_USER\\\\Software\\"),
            vec!["HKEY_CURRENT_USER", "Software"]
        );
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "HKEY_CURRENT_USER"), "HKEY_CURRENT_USER");
        assert_eq!(
            join_path("HKEY_CURRENT_USER\\Software", "MyApp"),
            "HKEY_CURRENT_USER\\Software\\MyApp"
        );
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_and_name(""), None);
        assert_eq!(
            parent_and_name("HKEY_CURRENT_USER"),
            Some((String::new(), "HKEY_CURRENT_USER"))
        );
        assert_eq!(
            parent_and_name("HKEY_CURRENT_USER\\Software\\MyApp\\"),
            Some(("HKEY_CURRENT_USER\\Software".to_string(), "MyApp"))
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\\A\\\\B\\"), "A\\B");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_protected_paths() {
        assert!(is_protected(""));
        assert!(is_protected("HKEY_LOCAL_MACHINE"));
        assert!(is_protected("SomeOtherTopLevel"));
        assert!(is_protected("\\HKEY_LOCAL_MACHINE\\"));
        assert!(!is_protected("HKEY_LOCAL_MACHINE\\SOFTWARE"));
    }
}
