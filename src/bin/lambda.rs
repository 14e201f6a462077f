//! AWS Lambda entry point for the trending watcher.
//!
//! Deploy with `cargo lambda build --release --features lambda` and trigger
//! it from a scheduled rule.
//!
//! ## Environment Variables
//!
//! - `TRENDING_LANGUAGE`: language filter (default: `python`)
//! - `TRENDING_SINCE`: trending window (default: `daily`)
//! - `STORE_TABLE`: DynamoDB table keyed by `source_url` (default: `githubTrend`)
//! - `STORE_REGION`: region of the table (default: ambient region)
//! - `SLACK_URL`: incoming webhook URL (required)
//! - `CREDENTIALS_PATH`: credential file for the store (optional)
//! - `CREDENTIALS_SECRET_ID`: Secrets Manager id used to create that file
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trending_watch::lambda::handler;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Trending watcher Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
