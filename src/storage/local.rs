//! Local filesystem storage implementation.
//!
//! Keeps every stored repository in one JSON document, keyed by `source_url`.
//! Intended for local runs and tests; Lambda deployments use `DynamoStore`.
//!
//! ```text
//! storage/
//! └── repositories.json   # { "<source_url>": StoredEntity, ... }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StoredEntity;
use crate::storage::RepoStore;

type EntityMap = BTreeMap<String, StoredEntity>;

/// Local filesystem storage backend.
///
/// Each `put` is a read-modify-write of the whole file, so only one writer
/// may use a given file at a time.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored entity, ordered by `source_url`.
    pub async fn load_all(&self) -> Result<Vec<StoredEntity>> {
        Ok(self.read_entities().await?.into_values().collect())
    }

    /// Read the entity map; a missing file is an empty store.
    async fn read_entities(&self) -> Result<EntityMap> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EntityMap::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the entity map atomically (write to temp, then rename).
    async fn write_entities(&self, entities: &EntityMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(entities)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RepoStore for LocalStore {
    async fn count_by_source_url(&self, source_url: &str) -> Result<usize> {
        let entities = self
            .read_entities()
            .await
            .map_err(|e| AppError::store_query(format!("{}: {}", self.path.display(), e)))?;
        Ok(entities
            .values()
            .filter(|entity| entity.source_url == source_url)
            .count())
    }

    async fn put(&self, entity: &StoredEntity) -> Result<()> {
        let write = async {
            let mut entities = self.read_entities().await?;
            entities.insert(entity.source_url.clone(), entity.clone());
            self.write_entities(&entities).await
        };
        write
            .await
            .map_err(|e| AppError::store_write(format!("{}: {}", self.path.display(), e)))
    }
}
