// src/services/notifier.rs

//! Messaging webhook notifier.
//!
//! Posts one message per repository. A failed post is logged and counted;
//! the remaining posts still go out.

use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ListingRecord, NotifierConfig, SlackAttachment, SlackPayload};

/// Sends repository announcements to an incoming webhook.
pub struct SlackNotifier {
    client: Client,
    webhook_url: Url,
    config: NotifierConfig,
}

impl SlackNotifier {
    /// Create a notifier; fails when no usable webhook URL is configured.
    pub fn new(client: Client, config: &NotifierConfig) -> Result<Self> {
        if config.webhook_url.trim().is_empty() {
            return Err(AppError::config("notifier.webhook_url is not set"));
        }
        let webhook_url = Url::parse(config.webhook_url.trim())?;

        Ok(Self {
            client,
            webhook_url,
            config: config.clone(),
        })
    }

    /// Build the webhook payload for one repository.
    pub fn payload(&self, record: &ListingRecord) -> SlackPayload {
        SlackPayload {
            text: record.format(&self.config.text_template),
            username: self.config.username.clone(),
            icon_emoji: self.config.icon_emoji.clone(),
            icon_url: self.config.icon_url.clone(),
            channel: self.config.channel.clone(),
            attachments: vec![SlackAttachment {
                pretext: record.category.clone(),
                title: record.title.clone(),
                title_link: record.source_url.clone(),
                text: record.description.clone(),
                color: self.config.color.clone(),
            }],
        }
    }

    /// Post a single repository.
    pub async fn send(&self, record: &ListingRecord) -> Result<()> {
        self.client
            .post(self.webhook_url.clone())
            .json(&self.payload(record))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Post every repository, then report failures as one error.
    pub async fn notify_all(&self, records: &[ListingRecord]) -> Result<()> {
        let mut failed = 0;
        for record in records {
            match self.send(record).await {
                Ok(()) => log::info!("Announced {}", record.source_url),
                Err(e) => {
                    failed += 1;
                    log::warn!(
                        "Failed to send {} to {}: {}",
                        record.source_url,
                        self.webhook_url,
                        e
                    );
                }
            }
        }

        if failed > 0 {
            return Err(AppError::NotifyAggregate {
                failed,
                total: records.len(),
            });
        }
        Ok(())
    }
}
