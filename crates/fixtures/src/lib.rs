//! Destination managers that seed and tear down fixture data.
//!
//! Each manager resolves its destination, runs the override engine over its
//! definitions once at construction, and serves tag-filtered copies back to
//! the test. Persistence goes through the [`store`] traits.

pub mod body;
pub mod dynamodb;
pub mod error;
pub mod loader;
pub mod options;
pub mod resource;
pub mod s3;
pub mod store;

pub use dynamodb::{DynamoDbForge, DynamoDbForgeConfig};
pub use error::{FixtureError, Result};
pub use loader::{FixtureFile, Forge, ForgeEntry, ForgeKind};
pub use options::ForgeOptions;
pub use resource::{ResourceConfig, ResourceResolver, StaticResolver};
pub use s3::{S3Forge, S3ForgeConfig};
pub use store::{ItemStore, MemoryStore, ObjectStore};
