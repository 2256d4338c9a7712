//! Fixture files: forge definitions plus the override rules that apply to them.
//!
//! ```yaml
//! forges:
//!   - forge_id: projects
//!     dynamodb:
//!       table: { name: projects-table }
//!       primary_key_names: [PK]
//!       items:
//!         - tags: { type: project }
//!           data: { PK: "", name: "{} project" }
//! overrides:
//!   - key_paths: data.PK
//!     override_type: CALL_FUNCTION
//!     override: uuid
//!     forge_id: projects
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use forge_core::overrides::parse_rules;
use forge_core::{records_to_value, CallbackRegistry, OverrideRule, Query, Record};

use crate::dynamodb::{DynamoDbForge, DynamoDbForgeConfig};
use crate::error::{FixtureError, Result};
use crate::options::ForgeOptions;
use crate::s3::{S3Forge, S3ForgeConfig};
use crate::store::{ItemStore, ObjectStore};

/// Supported destination kinds, by their key in a forge entry.
pub const FORGE_KINDS: [&str; 2] = ["dynamodb", "s3"];

/// Destination config of one forge entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ForgeKind {
    DynamoDb(DynamoDbForgeConfig),
    S3(S3ForgeConfig),
}

impl ForgeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ForgeKind::DynamoDb(_) => "dynamodb",
            ForgeKind::S3(_) => "s3",
        }
    }
}

/// One `forges:` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ForgeEntry {
    pub forge_id: String,
    pub kind: ForgeKind,
}

impl ForgeEntry {
    /// Parse an entry holding `forge_id` and exactly one destination kind.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| FixtureError::Validation("forge entries must be mappings".to_string()))?;

        let forge_id = map
            .get("forge_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FixtureError::Validation("forge entry is missing 'forge_id'".to_string()))?
            .to_string();

        let present: Vec<&str> = FORGE_KINDS
            .into_iter()
            .filter(|kind| map.contains_key(*kind))
            .collect();

        let kind = match present.as_slice() {
            ["dynamodb"] => ForgeKind::DynamoDb(serde_json::from_value(map["dynamodb"].clone())?),
            ["s3"] => ForgeKind::S3(serde_json::from_value(map["s3"].clone())?),
            _ => {
                return Err(FixtureError::Validation(format!(
                    "can only have one of the following per config: {}",
                    FORGE_KINDS.join(", ")
                )))
            }
        };

        Ok(Self { forge_id, kind })
    }

    /// Construct the manager for this entry.
    pub fn build(&self, options: &ForgeOptions<'_>) -> Result<Forge> {
        match &self.kind {
            ForgeKind::DynamoDb(config) => Ok(Forge::DynamoDb(DynamoDbForge::new(&self.forge_id, config, options)?)),
            ForgeKind::S3(config) => Ok(Forge::S3(S3Forge::new(&self.forge_id, config, options)?)),
        }
    }
}

/// A constructed destination manager of either kind.
#[derive(Debug, Clone)]
pub enum Forge {
    DynamoDb(DynamoDbForge),
    S3(S3Forge),
}

impl Forge {
    pub fn forge_id(&self) -> &str {
        match self {
            Forge::DynamoDb(f) => f.forge_id(),
            Forge::S3(f) => f.forge_id(),
        }
    }

    pub fn get_data(&self, query: Option<&Query>) -> Result<Vec<Record>> {
        match self {
            Forge::DynamoDb(f) => f.get_data(query),
            Forge::S3(f) => f.get_data(query),
        }
    }

    pub fn get_data_without_tags(&self, query: Option<&Query>) -> Result<Vec<Record>> {
        match self {
            Forge::DynamoDb(f) => f.get_data_without_tags(query),
            Forge::S3(f) => f.get_data_without_tags(query),
        }
    }

    /// Cleanup keys as JSON: key mappings for tables, key strings for buckets.
    pub fn keys_value(&self) -> Value {
        match self {
            Forge::DynamoDb(f) => records_to_value(f.keys()),
            Forge::S3(f) => Value::Array(f.keys().iter().cloned().map(Value::String).collect()),
        }
    }

    pub fn load_data<S: ItemStore + ObjectStore>(&self, store: &mut S) -> Result<()> {
        match self {
            Forge::DynamoDb(f) => f.load_data(store),
            Forge::S3(f) => f.load_data(store),
        }
    }

    pub fn cleanup_data<S: ItemStore + ObjectStore>(&self, store: &mut S) -> Result<()> {
        match self {
            Forge::DynamoDb(f) => f.cleanup_data(store),
            Forge::S3(f) => f.cleanup_data(store),
        }
    }
}

/// Parsed contents of a fixture file.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    pub forges: Vec<ForgeEntry>,
    pub overrides: Vec<OverrideRule>,
}

impl FixtureFile {
    /// Read and parse a YAML (or JSON) fixture file.
    pub fn load(path: &Path, registry: &CallbackRegistry) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let fixture = Self::parse(&contents, registry)?;
        info!(
            path = %path.display(),
            forges = fixture.forges.len(),
            overrides = fixture.overrides.len(),
            "loaded fixture file"
        );
        Ok(fixture)
    }

    pub fn parse(contents: &str, registry: &CallbackRegistry) -> Result<Self> {
        let document: Value = serde_yaml::from_str(contents)?;
        let root = document
            .as_object()
            .ok_or_else(|| FixtureError::Validation("fixture file must be a mapping".to_string()))?;

        let forges = match root.get("forges") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(ForgeEntry::from_value)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(FixtureError::Validation("'forges' must be a list".to_string())),
        };

        let overrides = parse_rules(root.get("overrides").unwrap_or(&Value::Null), registry)?;

        Ok(Self { forges, overrides })
    }

    pub fn forge(&self, forge_id: &str) -> Option<&ForgeEntry> {
        self.forges.iter().find(|entry| entry.forge_id == forge_id)
    }

    pub fn forge_ids(&self) -> impl Iterator<Item = &str> {
        self.forges.iter().map(|entry| entry.forge_id.as_str())
    }
}
