//! Key-value table destination manager.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use forge_core::{filter_records, scoped_rules, strip_tags, Query, Record};

use crate::error::{FixtureError, Result};
use crate::options::ForgeOptions;
use crate::resource::ResourceConfig;
use crate::store::ItemStore;

/// Table fixture as written in a fixture file.
///
/// Each item is a mapping with a `data` record and optional `tags`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DynamoDbForgeConfig {
    pub table: ResourceConfig,
    pub primary_key_names: Vec<String>,
    #[serde(default)]
    pub items: Vec<Record>,
}

/// Seeds one table and remembers the keys needed to clean it up.
#[derive(Debug, Clone)]
pub struct DynamoDbForge {
    forge_id: String,
    table_name: String,
    primary_key_names: Vec<String>,
    items: Vec<Record>,
    keys: Vec<Record>,
}

impl DynamoDbForge {
    /// Resolve the table, apply overrides to the items and derive their keys.
    pub fn new(forge_id: &str, config: &DynamoDbForgeConfig, options: &ForgeOptions<'_>) -> Result<Self> {
        let table_name = options.resolver.resolve(&config.table)?;
        let rules = scoped_rules(options.overrides, forge_id);
        let items = options.engine.apply(&rules, &config.items)?;

        let keys = items
            .iter()
            .enumerate()
            .map(|(index, item)| primary_key(item, &config.primary_key_names, forge_id, index))
            .collect::<Result<Vec<_>>>()?;

        info!(
            forge_id = %forge_id,
            table = %table_name,
            items = items.len(),
            rules = rules.len(),
            "dynamodb forge ready"
        );

        Ok(Self {
            forge_id: forge_id.to_string(),
            table_name,
            primary_key_names: config.primary_key_names.clone(),
            items,
            keys,
        })
    }

    pub fn forge_id(&self) -> &str {
        &self.forge_id
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Keys that [`cleanup_data`](Self::cleanup_data) will delete.
    pub fn keys(&self) -> &[Record] {
        &self.keys
    }

    /// Copies of the overridden items, optionally filtered by tags.
    pub fn get_data(&self, query: Option<&Query>) -> Result<Vec<Record>> {
        Ok(filter_records(query, &self.items)?)
    }

    /// Same as [`get_data`](Self::get_data) with the `tags` key removed.
    pub fn get_data_without_tags(&self, query: Option<&Query>) -> Result<Vec<Record>> {
        Ok(strip_tags(self.get_data(query)?))
    }

    /// Track an extra key, e.g. for an item the code under test created.
    ///
    /// The key must hold exactly the table's primary key fields.
    pub fn add_key(&mut self, key: Record) -> Result<()> {
        let conforms = key.len() == self.primary_key_names.len()
            && self.primary_key_names.iter().all(|name| key.contains_key(name));
        if !conforms {
            return Err(FixtureError::Validation(format!(
                "key for forge '{}' must have exactly the fields: {}",
                self.forge_id,
                self.primary_key_names.join(", ")
            )));
        }
        self.keys.push(key);
        Ok(())
    }

    pub fn load_data(&self, store: &mut dyn ItemStore) -> Result<()> {
        for (index, item) in self.items.iter().enumerate() {
            let key = primary_key(item, &self.primary_key_names, &self.forge_id, index)?;
            store.put_item(&self.table_name, &key, item_data(item)?)?;
        }
        info!(forge_id = %self.forge_id, table = %self.table_name, items = self.items.len(), "loaded items");
        Ok(())
    }

    pub fn cleanup_data(&self, store: &mut dyn ItemStore) -> Result<()> {
        for key in &self.keys {
            store.delete_item(&self.table_name, key)?;
        }
        info!(forge_id = %self.forge_id, table = %self.table_name, keys = self.keys.len(), "cleaned up items");
        Ok(())
    }
}

fn item_data(item: &Record) -> Result<&Record> {
    item.get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| FixtureError::Validation("every item must have a 'data' mapping".to_string()))
}

fn primary_key(item: &Record, names: &[String], forge_id: &str, index: usize) -> Result<Record> {
    let data = item_data(item)?;
    let mut key = Record::new();
    for name in names {
        let value = data.get(name).ok_or_else(|| {
            FixtureError::Validation(format!(
                "item {} of forge '{}' is missing primary key '{}'",
                index, forge_id, name
            ))
        })?;
        key.insert(name.clone(), value.clone());
    }
    Ok(key)
}
