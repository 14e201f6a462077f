// src/models/mod.rs

//! Domain models for the trending watcher.

mod config;
mod repository;
mod slack;

// Re-export all public types
pub use config::{
    Config, CredentialConfig, FetcherConfig, ListingSelectors, NotifierConfig, StoreConfig,
};
pub use repository::{ListingRecord, StoredEntity};
pub use slack::{SlackAttachment, SlackPayload};
