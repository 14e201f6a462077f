// src/pipeline/run.rs

//! End-to-end run: fetch → parse → register first-seen → notify.

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, ListingRecord};
use crate::services::{ListingParser, PageFetcher, SlackNotifier};
use crate::storage::RepoStore;
use crate::utils::log::{step, summary};

use super::filter::NoveltyFilter;

const TOTAL_STEPS: usize = 4;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Entries found on the listing
    pub scraped: usize,
    /// Entries seen for the first time, in listing order
    pub new_repositories: Vec<ListingRecord>,
    /// Announcements sent
    pub notified: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Fetch and parse the listing without touching the store.
pub async fn scrape(config: &Config, client: &Client) -> Result<Vec<ListingRecord>> {
    let body = fetch_listing(config, client).await?;
    parse_listing(config, &body)
}

async fn fetch_listing(config: &Config, client: &Client) -> Result<Vec<u8>> {
    let url = config.fetcher.listing_url()?;
    log::info!("Fetching {}", url);
    PageFetcher::new(client.clone()).fetch(&url).await
}

fn parse_listing(config: &Config, body: &[u8]) -> Result<Vec<ListingRecord>> {
    let parser = ListingParser::new(&config.selectors, &config.fetcher.base_url)?;
    let records = parser.parse(body, config.fetcher.language.trim())?;
    log::info!("Found {} repositories on the listing", records.len());
    Ok(records)
}

/// Run the full pipeline once.
///
/// Fetch, parse and store errors end the run before anything is announced.
/// The notifier is only built once there is something to announce; a missing
/// webhook is then reported like any other notification failure.
pub async fn run_pipeline(
    config: &Config,
    store: &dyn RepoStore,
    client: &Client,
) -> Result<RunSummary> {
    let started_at = Utc::now();

    step(1, TOTAL_STEPS, "Fetch - Downloading trending listing");
    let body = fetch_listing(config, client).await?;

    step(2, TOTAL_STEPS, "Parse - Extracting repositories");
    let records = parse_listing(config, &body)?;

    step(3, TOTAL_STEPS, "Filter - Registering first-seen repositories");
    let new_repositories = NoveltyFilter::new(store).filter_new(&records).await?;

    step(4, TOTAL_STEPS, "Notify - Announcing new repositories");
    if new_repositories.is_empty() {
        log::info!("Nothing new to announce");
    } else {
        SlackNotifier::new(client.clone(), &config.notifier)?
            .notify_all(&new_repositories)
            .await?;
    }

    let finished_at = Utc::now();
    summary(
        "Trending run complete",
        &[
            ("scraped", records.len().to_string()),
            ("new", new_repositories.len().to_string()),
            (
                "elapsed",
                format!("{}ms", (finished_at - started_at).num_milliseconds()),
            ),
        ],
    );

    Ok(RunSummary {
        scraped: records.len(),
        notified: new_repositories.len(),
        new_repositories,
        started_at,
        finished_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::LocalStore;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    const LISTING: &str = r#"
        <article class="Box-row">
          <h2><a href="/a/foo"> a / foo </a></h2>
          <p class="col-9">d</p>
        </article>
        <article class="Box-row">
          <h2><a href="/b/bar">b / bar</a></h2>
        </article>
    "#;

    fn config(server: &Server) -> Config {
        let mut config = Config::default();
        config.fetcher.base_url = server.url();
        config.notifier.webhook_url = format!("{}/hook", server.url());
        config
    }

    async fn mock_listing(server: &mut Server, status: usize) -> mockito::Mock {
        server
            .mock("GET", "/trending/python")
            .match_query(Matcher::UrlEncoded("since".into(), "daily".into()))
            .with_status(status)
            .with_body(LISTING)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_run_twice_announces_once() {
        let mut server = Server::new_async().await;
        let _listing = mock_listing(&mut server, 200).await;
        let hook = server
            .mock("POST", "/hook")
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("repositories.json"));
        let config = config(&server);
        let client = Client::new();

        let first = run_pipeline(&config, &store, &client).await.unwrap();
        assert_eq!(first.scraped, 2);
        assert_eq!(first.notified, 2);
        assert_eq!(first.new_repositories[0].title, "a / foo");
        assert_eq!(
            first.new_repositories[0].source_url,
            format!("{}/a/foo", server.url())
        );

        let second = run_pipeline(&config, &store, &client).await.unwrap();
        assert_eq!(second.scraped, 2);
        assert!(second.new_repositories.is_empty());

        hook.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_store_and_notify() {
        let mut server = Server::new_async().await;
        let _listing = mock_listing(&mut server, 503).await;
        let hook = server
            .mock("POST", "/hook")
            .expect(0)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("repositories.json"));

        let err = run_pipeline(&config(&server), &store, &Client::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::HttpStatus { status: 503, .. }));
        assert!(store.load_all().await.unwrap().is_empty());
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn test_notify_failure_is_final_error_but_store_is_kept() {
        let mut server = Server::new_async().await;
        let _listing = mock_listing(&mut server, 200).await;
        let _hook = server
            .mock("POST", "/hook")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("repositories.json"));

        let err = run_pipeline(&config(&server), &store, &Client::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::NotifyAggregate {
                failed: 2,
                total: 2
            }
        ));
        assert_eq!(store.load_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_webhook_only_matters_when_something_is_new() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/trending/python")
            .match_query(Matcher::UrlEncoded("since".into(), "daily".into()))
            .with_body(LISTING)
            .expect(2)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("repositories.json"));
        let mut config = config(&server);
        config.notifier.webhook_url = String::new();
        let client = Client::new();

        let err = run_pipeline(&config, &store, &client).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(store.load_all().await.unwrap().len(), 2);

        let summary = run_pipeline(&config, &store, &client).await.unwrap();
        assert_eq!(summary.scraped, 2);
        assert!(summary.new_repositories.is_empty());
        assert_eq!(summary.notified, 0);

        listing.assert_async().await;
    }
}
