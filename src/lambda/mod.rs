// src/lambda/mod.rs

//! AWS Lambda handler for the trending watcher.
//!
//! One invocation (normally from a scheduled rule):
//! 1. Loads configuration from the environment
//! 2. Materializes the store credential file (removed again on exit)
//! 3. Runs the pipeline against DynamoDB
//! 4. Reports the outcome to the runtime

use std::time::Instant;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config;
use crate::credentials::CredentialScope;
use crate::error::Result;
use crate::pipeline::{RunSummary, run_pipeline};
use crate::storage::DynamoStore;
use crate::utils::http::create_async_client;

/// Lambda invocation payload.
///
/// Scheduled events carry unrelated fields; they are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TrendingRequest {
    /// Language to watch instead of the configured one
    #[serde(default)]
    pub language: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct TrendingResponse {
    /// Whether the run was successful
    pub success: bool,

    /// Repositories found on the listing
    pub scraped: usize,

    /// Titles of repositories seen for the first time
    pub new_repositories: Vec<String>,

    /// Announcements sent
    pub notified: usize,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl TrendingResponse {
    fn from_summary(summary: RunSummary, start: Instant) -> Self {
        Self {
            success: true,
            scraped: summary.scraped,
            new_repositories: summary
                .new_repositories
                .into_iter()
                .map(|record| record.title)
                .collect(),
            notified: summary.notified,
            execution_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Main Lambda handler function.
///
/// Failures are returned as errors so the invocation is marked failed and the
/// scheduler's own retry policy applies.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<TrendingRequest>,
) -> std::result::Result<TrendingResponse, LambdaError> {
    let start = Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting trending run: language={:?}", request.language);

    match run_invocation(&request).await {
        Ok(summary) => {
            let response = TrendingResponse::from_summary(summary, start);
            info!(
                "Run completed: {} scraped, {} new in {}ms",
                response.scraped,
                response.new_repositories.len(),
                response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Run failed after {}ms: {}", start.elapsed().as_millis(), e);
            Err(e.into())
        }
    }
}

/// Internal run logic.
async fn run_invocation(request: &TrendingRequest) -> Result<RunSummary> {
    let mut config = config::load(None)?;
    if let Some(language) = &request.language {
        config.fetcher.language = language.clone();
    }

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets = aws_sdk_secretsmanager::Client::new(&sdk_config);

    // Held until the end of the run; dropping it removes a downloaded file.
    let credentials = CredentialScope::acquire(&config.credentials, &secrets).await?;

    let store = DynamoStore::connect(&config.store, credentials.path()).await?;
    let client = create_async_client(&config.fetcher)?;

    run_pipeline(&config, &store, &client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_request_defaults() {
        let json = r#"{}"#;
        let req: TrendingRequest = serde_json::from_str(json).unwrap();
        assert!(req.language.is_none());
    }

    #[test]
    fn test_trending_request_from_scheduled_event() {
        let json = r#"{
            "version": "0",
            "detail-type": "Scheduled Event",
            "source": "aws.events",
            "language": "rust"
        }"#;
        let req: TrendingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_response_serialization() {
        let response = TrendingResponse {
            success: true,
            scraped: 25,
            new_repositories: vec!["a / foo".to_string()],
            notified: 1,
            execution_time_ms: 812,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["new_repositories"][0], "a / foo");
    }
}
