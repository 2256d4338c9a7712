//! Persistence seam for destination managers.

use std::collections::BTreeMap;

use forge_core::Record;

use crate::error::Result;

/// Key-value table writes, keyed by table name.
pub trait ItemStore {
    /// Write `item`, replacing any stored item whose fields equal all of `key`.
    fn put_item(&mut self, table: &str, key: &Record, item: &Record) -> Result<()>;

    /// Delete every item whose fields equal all fields of `key`.
    fn delete_item(&mut self, table: &str, key: &Record) -> Result<()>;
}

/// Object storage writes, keyed by bucket name.
pub trait ObjectStore {
    fn put_object(&mut self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    fn delete_objects(&mut self, bucket: &str, keys: &[String]) -> Result<()>;
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<Record>>,
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<&[u8]> {
        self.buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(Vec::as_slice)
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map_or(0, BTreeMap::len)
    }
}

fn matches_key(item: &Record, key: &Record) -> bool {
    key.iter().all(|(name, value)| item.get(name) == Some(value))
}

impl ItemStore for MemoryStore {
    fn put_item(&mut self, table: &str, key: &Record, item: &Record) -> Result<()> {
        let items = self.tables.entry(table.to_string()).or_default();
        match items.iter_mut().find(|existing| matches_key(existing, key)) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(())
    }

    fn delete_item(&mut self, table: &str, key: &Record) -> Result<()> {
        if let Some(items) = self.tables.get_mut(table) {
            items.retain(|item| !matches_key(item, key));
        }
        Ok(())
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(&mut self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body);
        Ok(())
    }

    fn delete_objects(&mut self, bucket: &str, keys: &[String]) -> Result<()> {
        if let Some(objects) = self.buckets.get_mut(bucket) {
            for key in keys {
                objects.remove(key);
            }
        }
        Ok(())
    }
}
