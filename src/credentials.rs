// src/credentials.rs

//! Scoped credential material for the durable store.
//!
//! A [`CredentialScope`] makes sure the credential file exists for as long as
//! the scope lives. A file the scope had to download is removed again when the
//! scope is dropped, on success, on an early `?` return, and on panic unwind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CredentialConfig;

/// Source of secret strings, e.g. AWS Secrets Manager.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the secret string stored under `secret_id` at `version_stage`.
    async fn fetch(&self, secret_id: &str, version_stage: &str) -> Result<String>;
}

#[cfg(feature = "aws")]
#[async_trait]
impl SecretSource for aws_sdk_secretsmanager::Client {
    async fn fetch(&self, secret_id: &str, version_stage: &str) -> Result<String> {
        let output = self
            .get_secret_value()
            .secret_id(secret_id)
            .version_stage(version_stage)
            .send()
            .await
            .map_err(|e| {
                AppError::credentials(format!(
                    "Secrets Manager lookup of {secret_id} failed: {}",
                    e.into_service_error()
                ))
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| AppError::credentials(format!("secret {secret_id} has no string value")))
    }
}

/// Guard over the credential file used by the store client.
#[derive(Debug)]
pub struct CredentialScope {
    path: Option<PathBuf>,
    materialized: bool,
}

impl CredentialScope {
    /// A scope that provides no credential file.
    pub fn none() -> Self {
        Self {
            path: None,
            materialized: false,
        }
    }

    /// Make the configured credential file available.
    ///
    /// - no path configured: empty scope
    /// - file already present: used as-is and left in place on release
    /// - file missing: downloaded from `source` and removed on release
    ///
    /// Unlike a downloaded file, a file that was already present is never
    /// deleted; only files this scope wrote are cleaned up.
    pub async fn acquire(config: &CredentialConfig, source: &dyn SecretSource) -> Result<Self> {
        let Some(path) = &config.path else {
            return Ok(Self::none());
        };

        if tokio::fs::try_exists(path).await? {
            log::debug!("Credential file {} already present", path.display());
            return Ok(Self {
                path: Some(path.clone()),
                materialized: false,
            });
        }

        let secret_id = config.secret_id.as_deref().ok_or_else(|| {
            AppError::credentials(format!(
                "{} does not exist and no secret id is configured",
                path.display()
            ))
        })?;

        let secret = source.fetch(secret_id, &config.version_stage).await?;
        write_private(path, secret.as_bytes()).await?;
        log::info!("Credential file written to {}", path.display());

        Ok(Self {
            path: Some(path.clone()),
            materialized: true,
        })
    }

    /// Path of the credential file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for CredentialScope {
    fn drop(&mut self) {
        if !self.materialized {
            return;
        }
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => log::info!("Credential file {} removed", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Write bytes atomically, readable by the owner only.
async fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let written = async {
        let mut file = options.open(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
        }
        return Err(e.into());
    }
    Ok(())
}
