//! Incoming-webhook payload.

use serde::{Deserialize, Serialize};

/// Attachment carrying the repository details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackAttachment {
    pub pretext: String,
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub color: String,
}

/// Body posted to the messaging webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackPayload {
    pub text: String,
    pub username: String,
    pub icon_emoji: String,
    pub icon_url: String,
    pub channel: String,
    pub attachments: Vec<SlackAttachment>,
}
