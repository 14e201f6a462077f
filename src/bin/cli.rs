//! Trending watcher CLI
//!
//! Local execution entry point. For AWS Lambda, use `trending-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::Client;
use trending_watch::{
    config,
    error::Result,
    models::Config,
    pipeline::{self, RunSummary},
    storage::LocalStore,
    utils::http,
};

/// Trending Watch - announces newly trending GitHub repositories
#[derive(Parser, Debug)]
#[command(
    name = "trending",
    version,
    about = "Announces repositories the first time they appear on GitHub trending"
)]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "trending.toml")]
    config: PathBuf,

    /// Language to watch instead of the configured one
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the listing, record new repositories and announce them
    Run {
        /// Where first-seen repositories are recorded
        #[arg(long, value_enum, default_value_t = StoreKind::Local)]
        store: StoreKind,
    },

    /// Fetch and parse the listing only, printing the records as JSON
    Scrape,

    /// Show what the local store has recorded
    Info {
        /// Number of most recent repositories to list
        #[arg(long, default_value_t = 10)]
        recent: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StoreKind {
    /// JSON file at `store.local_path`
    Local,
    /// DynamoDB table `store.table`
    #[cfg(feature = "aws")]
    Dynamo,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[cfg(feature = "aws")]
async fn run_with_dynamo(config: &Config, client: &Client) -> Result<RunSummary> {
    use trending_watch::credentials::CredentialScope;
    use trending_watch::storage::DynamoStore;

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets = aws_sdk_secretsmanager::Client::new(&sdk_config);
    let credentials = CredentialScope::acquire(&config.credentials, &secrets).await?;

    let store = DynamoStore::connect(&config.store, credentials.path()).await?;
    pipeline::run_pipeline(config, &store, client).await
}

async fn run_with_local(config: &Config, client: &Client) -> Result<RunSummary> {
    let store = LocalStore::new(&config.store.local_path);
    log::info!("Recording to {}", store.path().display());
    pipeline::run_pipeline(config, &store, client).await
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Trending watcher starting...");

    let mut config = config::load(Some(cli.config.as_path()))?;
    if let Some(language) = cli.language {
        config.fetcher.language = language;
    }
    log::info!("Loaded configuration from {}", cli.config.display());

    let client = http::create_async_client(&config.fetcher)?;

    match cli.command {
        Command::Run { store } => {
            let summary = match store {
                StoreKind::Local => run_with_local(&config, &client).await?,
                #[cfg(feature = "aws")]
                StoreKind::Dynamo => run_with_dynamo(&config, &client).await?,
            };

            for record in &summary.new_repositories {
                log::info!("New: {} ({})", record.title, record.source_url);
            }
            log::info!(
                "{} of {} listed repositories were new",
                summary.new_repositories.len(),
                summary.scraped
            );
        }

        Command::Scrape => {
            let records = pipeline::scrape(&config, &client).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Command::Info { recent } => {
            let store = LocalStore::new(&config.store.local_path);
            let mut entities = store.load_all().await?;
            log::info!("Store: {}", store.path().display());
            log::info!("Recorded repositories: {}", entities.len());

            entities.sort_by(|a, b| b.first_seen_at.cmp(&a.first_seen_at));
            for entity in entities.iter().take(recent) {
                log::info!(
                    "    {} [{}] {} ({})",
                    entity.first_seen_at.format("%Y-%m-%d %H:%M"),
                    entity.category,
                    entity.title,
                    entity.source_url
                );
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
