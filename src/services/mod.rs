//! Service layer for the trending watcher.
//!
//! This module contains the components the pipeline strings together:
//! - Listing download (`PageFetcher`)
//! - Listing markup parsing (`ListingParser`)
//! - Webhook announcements (`SlackNotifier`)

mod fetcher;
mod notifier;
mod parser;

pub use fetcher::PageFetcher;
pub use notifier::SlackNotifier;
pub use parser::ListingParser;
