//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing page location and HTTP behavior
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// CSS selectors for the listing markup
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Durable store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Messaging webhook settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Credential material for the store
    #[serde(default)]
    pub credentials: CredentialConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        self.fetcher.listing_url()?;
        if self.store.table.trim().is_empty() {
            return Err(AppError::validation("store.table is empty"));
        }
        if !self.notifier.webhook_url.is_empty() {
            Url::parse(&self.notifier.webhook_url).map_err(|e| {
                AppError::validation(format!("notifier.webhook_url is not a URL: {e}"))
            })?;
        }
        if self.credentials.secret_id.is_some() && self.credentials.path.is_none() {
            return Err(AppError::validation(
                "credentials.secret_id requires credentials.path",
            ));
        }
        Ok(())
    }
}

/// Listing location and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Origin of the listing site; relative links resolve against it
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Language filter, also used as the record category
    #[serde(default = "defaults::language")]
    pub language: String,

    /// Trending window (`daily`, `weekly`, `monthly`)
    #[serde(default = "defaults::since")]
    pub since: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    /// Build the listing URL, e.g. `https://github.com/trending/python?since=daily`.
    pub fn listing_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::config(format!("base_url cannot hold a path: {}", self.base_url))
            })?;
            segments.pop_if_empty().push("trending");
            let language = self.language.trim();
            if !language.is_empty() {
                segments.push(language);
            }
        }
        let since = self.since.trim();
        if !since.is_empty() {
            url.query_pairs_mut().append_pair("since", since);
        }
        Ok(url)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            language: defaults::language(),
            since: defaults::since(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// CSS selectors for scraping the trending listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Selector for each repository entry
    #[serde(default = "defaults::row_selector")]
    pub row: String,

    /// Selector for the title anchor within an entry
    #[serde(default = "defaults::title_selector")]
    pub title: String,

    /// Selector for the description within an entry
    #[serde(default = "defaults::description_selector")]
    pub description: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            row: defaults::row_selector(),
            title: defaults::title_selector(),
            description: defaults::description_selector(),
        }
    }
}

/// Durable store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// DynamoDB table name, partition key `source_url`
    #[serde(default = "defaults::table")]
    pub table: String,

    /// AWS region override (ambient region when unset)
    #[serde(default)]
    pub region: Option<String>,

    /// JSON file used by the local store
    #[serde(default = "defaults::local_path")]
    pub local_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: defaults::table(),
            region: None,
            local_path: defaults::local_path(),
        }
    }
}

/// Messaging webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Incoming webhook URL
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub icon_emoji: String,

    #[serde(default = "defaults::icon_url")]
    pub icon_url: String,

    /// Channel override (webhook default when empty)
    #[serde(default)]
    pub channel: String,

    /// Attachment side-bar color
    #[serde(default)]
    pub color: String,

    /// Message text; placeholders as in `ListingRecord::format`
    #[serde(default = "defaults::text_template")]
    pub text_template: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: String::new(),
            icon_emoji: String::new(),
            icon_url: defaults::icon_url(),
            channel: String::new(),
            color: String::new(),
            text_template: defaults::text_template(),
        }
    }
}

/// Location and origin of the store credential file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Where the credential file lives (or gets written)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Secrets Manager id used to materialize a missing file
    #[serde(default)]
    pub secret_id: Option<String>,

    #[serde(default = "defaults::version_stage")]
    pub version_stage: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            path: None,
            secret_id: None,
            version_stage: defaults::version_stage(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Fetcher defaults
    pub fn base_url() -> String {
        "https://github.com".into()
    }
    pub fn language() -> String {
        "python".into()
    }
    pub fn since() -> String {
        "daily".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; trending-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Selector defaults
    pub fn row_selector() -> String {
        "article.Box-row".into()
    }
    pub fn title_selector() -> String {
        "h2 a, h1 a".into()
    }
    pub fn description_selector() -> String {
        "p.col-9".into()
    }

    // Store defaults
    pub fn table() -> String {
        "githubTrend".into()
    }
    pub fn local_path() -> PathBuf {
        PathBuf::from("storage/repositories.json")
    }

    // Notifier defaults
    pub fn icon_url() -> String {
        "https://assets-cdn.github.com/images/modules/logos_page/GitHub-Mark.png".into()
    }
    pub fn text_template() -> String {
        "New trending {category} repository: {title}".into()
    }

    // Credential defaults
    pub fn version_stage() -> String {
        "AWSCURRENT".into()
    }
}
