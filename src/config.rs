// src/config.rs

//! Configuration loading utilities.
//!
//! The configuration is assembled once at start-up: TOML file (or defaults),
//! then environment overrides, then validation. Components only ever see the
//! resulting [`Config`].

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Load, overlay the process environment and validate.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Overlay values found through `lookup` onto `config`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = var("TRENDING_BASE_URL") {
        config.fetcher.base_url = base_url;
    }
    if let Some(language) = var("TRENDING_LANGUAGE") {
        config.fetcher.language = language;
    }
    if let Some(since) = var("TRENDING_SINCE") {
        config.fetcher.since = since;
    }
    if let Some(timeout) = var("CRAWL_TIMEOUT_SECS") {
        config.fetcher.timeout_secs = timeout.trim().parse().map_err(|_| {
            AppError::config(format!("CRAWL_TIMEOUT_SECS is not a number: {timeout}"))
        })?;
    }

    if let Some(table) = var("STORE_TABLE") {
        config.store.table = table;
    }
    if let Some(region) = var("STORE_REGION") {
        config.store.region = Some(region);
    }
    if let Some(path) = var("STORE_PATH") {
        config.store.local_path = PathBuf::from(path);
    }

    if let Some(webhook_url) = var("SLACK_URL") {
        config.notifier.webhook_url = webhook_url;
    }
    if let Some(channel) = var("SLACK_CHANNEL") {
        config.notifier.channel = channel;
    }

    if let Some(path) = var("CREDENTIALS_PATH") {
        config.credentials.path = Some(PathBuf::from(path));
    }
    if let Some(secret_id) = var("CREDENTIALS_SECRET_ID") {
        config.credentials.secret_id = Some(secret_id);
    }

    Ok(())
}
