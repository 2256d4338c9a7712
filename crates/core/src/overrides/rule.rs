//! Override rule types and parsing from dynamic configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ForgeError, Result};
use crate::key_path::{key_paths_from_value, KeyPath};

use super::callbacks::{Callback, CallbackRegistry};

/// The closed set of mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideType {
    ReplaceValue,
    FormatValue,
    CallFunction,
}

impl OverrideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideType::ReplaceValue => "REPLACE_VALUE",
            OverrideType::FormatValue => "FORMAT_VALUE",
            OverrideType::CallFunction => "CALL_FUNCTION",
        }
    }

    /// Parse a configured `override_type`: the variant name or its
    /// discriminant (`0`, `1`, `2`).
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        let parsed = match value {
            Some(Value::String(s)) => match s.as_str() {
                "REPLACE_VALUE" => Some(OverrideType::ReplaceValue),
                "FORMAT_VALUE" => Some(OverrideType::FormatValue),
                "CALL_FUNCTION" => Some(OverrideType::CallFunction),
                _ => None,
            },
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => Some(OverrideType::ReplaceValue),
                Some(1) => Some(OverrideType::FormatValue),
                Some(2) => Some(OverrideType::CallFunction),
                _ => None,
            },
            _ => None,
        };

        parsed.ok_or_else(|| {
            let shown = match value {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "null".to_string(),
            };
            ForgeError::UnsupportedOverrideType(shown)
        })
    }
}

impl fmt::Display for OverrideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation together with its payload.
#[derive(Debug, Clone)]
pub enum OverrideAction {
    /// Set the leaf to this literal.
    Replace(Value),
    /// Use the leaf as a template filled with these positional arguments.
    Format(Vec<Value>),
    /// Set the leaf to the callback's return value.
    Call(Callback),
}

impl OverrideAction {
    pub fn override_type(&self) -> OverrideType {
        match self {
            OverrideAction::Replace(_) => OverrideType::ReplaceValue,
            OverrideAction::Format(_) => OverrideType::FormatValue,
            OverrideAction::Call(_) => OverrideType::CallFunction,
        }
    }
}

/// One declarative override: where to mutate, how, and for which forge.
#[derive(Debug, Clone)]
pub struct OverrideRule {
    pub key_paths: Vec<KeyPath>,
    pub action: OverrideAction,
    /// Restricts the rule to one destination; `None` applies everywhere.
    pub forge_id: Option<String>,
}

impl OverrideRule {
    pub fn new<I, S>(key_paths: I, action: OverrideAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            key_paths: key_paths.into_iter().map(|p| KeyPath::new(p.as_ref())).collect(),
            action,
            forge_id: None,
        }
    }

    pub fn replace<I, S>(key_paths: I, value: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(key_paths, OverrideAction::Replace(value))
    }

    pub fn format<I, S>(key_paths: I, args: Vec<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(key_paths, OverrideAction::Format(args))
    }

    pub fn call<I, S, F>(key_paths: I, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str, &Value, &crate::record::Record) -> Value + Send + Sync + 'static,
    {
        Self::new(key_paths, OverrideAction::Call(Callback::new(func)))
    }

    /// Scope the rule to a single forge.
    pub fn scoped_to(mut self, forge_id: &str) -> Self {
        self.forge_id = Some(forge_id.to_string());
        self
    }

    pub fn override_type(&self) -> OverrideType {
        self.action.override_type()
    }

    /// Whether the rule should be handed to the forge `forge_id`.
    pub fn applies_to(&self, forge_id: &str) -> bool {
        self.forge_id.as_deref().map_or(true, |id| id == forge_id)
    }

    /// Build a rule from one configured mapping.
    ///
    /// `CALL_FUNCTION` payloads name a callback in `registry`.
    pub fn from_map(map: &Map<String, Value>, registry: &CallbackRegistry) -> Result<Self> {
        let key_paths = key_paths_from_value(map.get("key_paths"))?;
        let override_type = OverrideType::from_value(map.get("override_type"))?;
        let payload = map.get("override");

        let action = match override_type {
            OverrideType::ReplaceValue => {
                let value = payload.cloned().ok_or_else(|| {
                    ForgeError::InvalidRule("REPLACE_VALUE requires an 'override' value".to_string())
                })?;
                OverrideAction::Replace(value)
            }
            OverrideType::FormatValue => match payload {
                Some(Value::Array(args)) => OverrideAction::Format(args.clone()),
                _ => {
                    return Err(ForgeError::InvalidRule(
                        "FORMAT_VALUE requires a list of format arguments".to_string(),
                    ))
                }
            },
            OverrideType::CallFunction => match payload {
                Some(Value::String(name)) => {
                    let callback = registry
                        .get(name)
                        .cloned()
                        .ok_or_else(|| ForgeError::UnknownCallback(name.clone()))?;
                    OverrideAction::Call(callback)
                }
                _ => {
                    return Err(ForgeError::InvalidRule(
                        "CALL_FUNCTION requires the name of a registered callback".to_string(),
                    ))
                }
            },
        };

        let forge_id = match map.get("forge_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => {
                return Err(ForgeError::InvalidRule("forge_id must be a string".to_string()))
            }
        };

        Ok(Self {
            key_paths,
            action,
            forge_id,
        })
    }
}

/// Parse a configured rule list. `null` means no rules.
pub fn parse_rules(value: &Value, registry: &CallbackRegistry) -> Result<Vec<OverrideRule>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => return Err(ForgeError::InvalidRules),
    };

    let maps = items
        .iter()
        .map(|item| item.as_object().ok_or(ForgeError::InvalidRules))
        .collect::<Result<Vec<_>>>()?;

    maps.into_iter()
        .map(|map| OverrideRule::from_map(map, registry))
        .collect()
}
