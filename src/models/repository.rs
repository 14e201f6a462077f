//! Trending repository records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry scraped from the trending listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    /// Display name, e.g. `owner / repo`
    pub title: String,

    /// Absolute URL of the repository; identifies it across runs
    pub source_url: String,

    /// Short description (empty when the page has none)
    pub description: String,

    /// Language filter used for the fetch
    pub category: String,
}

impl ListingRecord {
    /// Format the record using a template.
    ///
    /// Supported placeholders: `{title}`, `{url}`, `{description}`, `{category}`.
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{title}", &self.title)
            .replace("{url}", &self.source_url)
            .replace("{description}", &self.description)
            .replace("{category}", &self.category)
    }
}

/// A repository as persisted in the durable store, keyed by `source_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredEntity {
    pub title: String,
    pub source_url: String,
    pub description: String,
    pub category: String,

    /// When the repository was first seen on the listing
    pub first_seen_at: DateTime<Utc>,
}

impl StoredEntity {
    /// Build the stored form of a record seen for the first time at `at`.
    pub fn first_seen(record: &ListingRecord, at: DateTime<Utc>) -> Self {
        Self {
            title: record.title.clone(),
            source_url: record.source_url.clone(),
            description: record.description.clone(),
            category: record.category.clone(),
            first_seen_at: at,
        }
    }
}
