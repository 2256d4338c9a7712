//! Callbacks for `CALL_FUNCTION` overrides and a registry to name them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::record::Record;

/// Signature of a `CALL_FUNCTION` callback: `(key, current value, enclosing record)`.
///
/// Only the return value is written back; the context is a read-only view.
pub type CallbackFn = dyn Fn(&str, &Value, &Record) -> Value + Send + Sync;

/// A shareable callback with an optional name for diagnostics.
#[derive(Clone)]
pub struct Callback {
    name: Option<String>,
    func: Arc<CallbackFn>,
}

impl Callback {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str, &Value, &Record) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    pub fn named<F>(name: &str, func: F) -> Self
    where
        F: Fn(&str, &Value, &Record) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(name.to_string()),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn invoke(&self, key: &str, current: &Value, context: &Record) -> Value {
        (self.func)(key, current, context)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name.as_deref().unwrap_or("<anonymous>"))
            .finish()
    }
}

/// Named callbacks that configuration files can refer to.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    callbacks: BTreeMap<String, Callback>,
}

impl CallbackRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with `uuid` and `now`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("uuid", |_, _, _| Value::String(uuid::Uuid::new_v4().to_string()));
        registry.register("now", |_, _, _| Value::String(chrono::Utc::now().to_rfc3339()));
        registry
    }

    /// Register (or replace) a callback under `name`.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&str, &Value, &Record) -> Value + Send + Sync + 'static,
    {
        self.callbacks
            .insert(name.to_string(), Callback::named(name, func));
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.callbacks.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtins_are_registered() {
        let registry = CallbackRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["now", "uuid"]);

        let uuid = registry.get("uuid").unwrap();
        let first = uuid.invoke("id", &json!(""), &Record::new());
        let second = uuid.invoke("id", &json!(""), &Record::new());
        assert_ne!(first, second);
        assert_eq!(first.as_str().unwrap().len(), 36);
    }

    #[test]
    fn registered_callback_sees_arguments() {
        let mut registry = CallbackRegistry::new();
        registry.register("suffix", |key, value, context| {
            json!(format!("{}:{}:{}", key, value.as_str().unwrap_or(""), context.len()))
        });

        let mut context = Record::new();
        context.insert("name".into(), json!("a"));
        let cb = registry.get("suffix").unwrap();
        assert_eq!(cb.name(), Some("suffix"));
        assert_eq!(cb.invoke("name", &json!("a"), &context), json!("name:a:1"));
        assert!(registry.get("missing").is_none());
    }
}
