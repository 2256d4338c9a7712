//! Key-path override and tag-query engines for deterministic test fixtures.
//!
//! - [`overrides`]: mutate nested records before they are loaded
//! - [`query`]: filter loaded records by their tags

pub mod config;
pub mod error;
pub mod key_path;
pub mod overrides;
pub mod query;
pub mod record;

pub use config::{ForgeConfig, SuppressionPolicy};
pub use error::*;
pub use key_path::KeyPath;
pub use overrides::{
    scoped_rules, CallbackRegistry, OverrideAction, OverrideEngine, OverrideRule, OverrideType,
};
pub use query::{filter_records, Query, QueryOperator};
pub use record::{records_to_value, strip_tags, Record, TAGS_KEY};
