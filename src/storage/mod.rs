//! Storage abstractions for repository persistence.
//!
//! The durable store answers two questions only:
//! - how many entities already exist for a `source_url` (query by equality)
//! - store this entity under its key (`source_url`)
//!
//! Backends:
//! - [`LocalStore`]: a single JSON file, for the CLI and tests
//! - `DynamoStore`: an AWS DynamoDB table (`aws` feature)

#[cfg(feature = "aws")]
pub mod dynamo;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StoredEntity;

// Re-export for convenience
#[cfg(feature = "aws")]
pub use dynamo::DynamoStore;
pub use local::LocalStore;

/// Trait for repository storage backends.
///
/// Every call is an independent round trip; there is no transaction spanning
/// a count and the following put.
#[async_trait]
pub trait RepoStore: Send + Sync {
    /// Count stored entities whose `source_url` equals `source_url`.
    async fn count_by_source_url(&self, source_url: &str) -> Result<usize>;

    /// Persist an entity, replacing any entity with the same key.
    async fn put(&self, entity: &StoredEntity) -> Result<()>;
}
