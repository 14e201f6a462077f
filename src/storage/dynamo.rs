//! AWS DynamoDB storage implementation.
//!
//! Table layout: partition key `source_url` (S). Remaining attributes are
//! `title`, `description`, `category` and `first_seen_at` (RFC 3339).

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use log::{debug, info};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{StoreConfig, StoredEntity};
use crate::storage::RepoStore;

/// Static credentials as stored in the credential file.
#[derive(Debug, Deserialize)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl StaticCredentials {
    /// Read credentials from a JSON file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::credentials(format!("invalid credential file {}: {}", path.display(), e))
        })
    }

    fn into_sdk(self) -> Credentials {
        Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            self.session_token,
            None,
            "credential-file",
        )
    }
}

/// DynamoDB-backed repository store.
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Create a new DynamoDB store from an existing client.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Connect using the ambient AWS configuration.
    ///
    /// When `credential_file` is given, its static credentials replace the
    /// default provider chain.
    pub async fn connect(config: &StoreConfig, credential_file: Option<&Path>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(path) = credential_file {
            info!("Using store credentials from {}", path.display());
            let credentials = StaticCredentials::from_file(path).await?;
            builder = builder.credentials_provider(credentials.into_sdk());
        }

        Ok(Self::new(Client::from_conf(builder.build()), &config.table))
    }

    fn to_item(entity: &StoredEntity) -> [(&'static str, AttributeValue); 5] {
        [
            ("source_url", AttributeValue::S(entity.source_url.clone())),
            ("title", AttributeValue::S(entity.title.clone())),
            ("description", AttributeValue::S(entity.description.clone())),
            ("category", AttributeValue::S(entity.category.clone())),
            (
                "first_seen_at",
                AttributeValue::S(entity.first_seen_at.to_rfc3339()),
            ),
        ]
    }
}

#[async_trait]
impl RepoStore for DynamoStore {
    async fn count_by_source_url(&self, source_url: &str) -> Result<usize> {
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("source_url = :url")
            .expression_attribute_values(":url", AttributeValue::S(source_url.to_string()))
            .select(Select::Count)
            .send()
            .await
            .map_err(|e| AppError::store_query(e.into_service_error()))?;

        let count = usize::try_from(output.count()).unwrap_or(0);
        debug!("{} stored entities for {}", count, source_url);
        Ok(count)
    }

    async fn put(&self, entity: &StoredEntity) -> Result<()> {
        let mut request = self.client.put_item().table_name(&self.table);
        for (name, value) in Self::to_item(entity) {
            request = request.item(name, value);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::store_write(e.into_service_error()))?;

        info!("Stored {} in {}", entity.source_url, self.table);
        Ok(())
    }
}
