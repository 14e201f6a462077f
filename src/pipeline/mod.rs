//! Pipeline entry points for watcher operations.
//!
//! - `scrape`: Fetch and parse the trending listing
//! - `run_pipeline`: Fetch, register first-seen repositories, announce them

pub mod filter;
pub mod run;

pub use filter::NoveltyFilter;
pub use run::{RunSummary, run_pipeline, scrape};
