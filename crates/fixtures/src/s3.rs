//! Object storage destination manager.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use forge_core::{filter_records, scoped_rules, strip_tags, Query, Record};

use crate::body::encode_body;
use crate::error::{FixtureError, Result};
use crate::options::ForgeOptions;
use crate::resource::ResourceConfig;
use crate::store::ObjectStore;

/// Bucket fixture as written in a fixture file.
///
/// Each object is a mapping with `key`, `data` and optional `tags`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct S3ForgeConfig {
    pub bucket: ResourceConfig,
    #[serde(default)]
    pub s3_objects: Vec<Record>,
}

/// Seeds one bucket and remembers the object keys to delete.
#[derive(Debug, Clone)]
pub struct S3Forge {
    forge_id: String,
    bucket_name: String,
    objects: Vec<Record>,
    keys: Vec<String>,
}

impl S3Forge {
    /// Resolve the bucket and apply overrides to the object definitions.
    pub fn new(forge_id: &str, config: &S3ForgeConfig, options: &ForgeOptions<'_>) -> Result<Self> {
        let bucket_name = options.resolver.resolve(&config.bucket)?;
        let rules = scoped_rules(options.overrides, forge_id);
        let objects = options.engine.apply(&rules, &config.s3_objects)?;

        let keys = objects
            .iter()
            .map(|object| {
                object
                    .get("key")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        FixtureError::Validation(format!(
                            "every s3 object of forge '{}' must have a string 'key'",
                            forge_id
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            forge_id = %forge_id,
            bucket = %bucket_name,
            objects = objects.len(),
            rules = rules.len(),
            "s3 forge ready"
        );

        Ok(Self {
            forge_id: forge_id.to_string(),
            bucket_name,
            objects,
            keys,
        })
    }

    pub fn forge_id(&self) -> &str {
        &self.forge_id
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Object keys that [`cleanup_data`](Self::cleanup_data) will delete.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Copies of the overridden object definitions, optionally filtered by tags.
    pub fn get_data(&self, query: Option<&Query>) -> Result<Vec<Record>> {
        Ok(filter_records(query, &self.objects)?)
    }

    /// Same as [`get_data`](Self::get_data) with the `tags` key removed.
    pub fn get_data_without_tags(&self, query: Option<&Query>) -> Result<Vec<Record>> {
        Ok(strip_tags(self.get_data(query)?))
    }

    pub fn add_key(&mut self, key: &str) {
        self.keys.push(key.to_string());
    }

    pub fn load_data(&self, store: &mut dyn ObjectStore) -> Result<()> {
        for (object, key) in self.objects.iter().zip(&self.keys) {
            let data = object.get("data").and_then(Value::as_object).ok_or_else(|| {
                FixtureError::Validation(format!("s3 object '{}' must have a 'data' mapping", key))
            })?;
            store.put_object(&self.bucket_name, key, encode_body(data)?)?;
        }
        info!(forge_id = %self.forge_id, bucket = %self.bucket_name, objects = self.objects.len(), "loaded objects");
        Ok(())
    }

    pub fn cleanup_data(&self, store: &mut dyn ObjectStore) -> Result<()> {
        store.delete_objects(&self.bucket_name, &self.keys)?;
        info!(forge_id = %self.forge_id, bucket = %self.bucket_name, keys = self.keys.len(), "cleaned up objects");
        Ok(())
    }
}
