//! Dot-delimited key paths into nested records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ForgeError, Result};

/// A route through nested records, e.g. `items.id`.
///
/// Always holds at least one segment. Segments are plain strings; an empty
/// segment (from `a..b`) simply never matches a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    raw: String,
    segments: Vec<String>,
}

impl KeyPath {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The final segment, i.e. the key that gets mutated.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(KeyPath::new(s))
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        KeyPath::new(s)
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        KeyPath::new(&s)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(KeyPath::new(&raw))
    }
}

/// Normalize a dynamic `key_paths` value into a non-empty list.
///
/// A bare string becomes a single path; a list must contain only strings.
pub fn key_paths_from_value(value: Option<&Value>) -> Result<Vec<KeyPath>> {
    let paths = match value {
        Some(Value::String(s)) => vec![KeyPath::new(s)],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(KeyPath::new).ok_or(ForgeError::InvalidKeyPaths))
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(ForgeError::InvalidKeyPaths),
    };

    if paths.is_empty() {
        return Err(ForgeError::InvalidKeyPaths);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_on_dots() {
        let path = KeyPath::new("audit.create_date");
        assert_eq!(path.segments(), ["audit", "create_date"]);
        assert_eq!(path.leaf(), "create_date");
        assert_eq!(path.to_string(), "audit.create_date");
    }

    #[test]
    fn bare_string_becomes_single_path() {
        let paths = key_paths_from_value(Some(&json!("id"))).unwrap();
        assert_eq!(paths, vec![KeyPath::new("id")]);
    }

    #[test]
    fn list_keeps_declared_order() {
        let paths = key_paths_from_value(Some(&json!(["id", "items.id"]))).unwrap();
        let raw: Vec<&str> = paths.iter().map(KeyPath::as_str).collect();
        assert_eq!(raw, ["id", "items.id"]);
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in [json!(1), json!([1]), json!(["id", null]), json!({}), json!([])] {
            let err = key_paths_from_value(Some(&bad)).unwrap_err();
            assert_eq!(err.to_string(), "key_paths must be a string or a list of strings");
        }
        assert!(key_paths_from_value(None).is_err());
    }
}
