//! Slack webhook notification channel.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{http_client, Notification, NotifyChannel, WEBHOOK_TIMEOUT};
use crate::error::ChannelError;

/// Slack section text limit used for the description.
const MAX_SECTION_CHARS: usize = 2000;

/// Attachment color for brands without a mapping.
const FALLBACK_COLOR: &str = "#FF0000";

/// Slack webhook notification channel.
pub struct SlackChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a Slack channel with a specific webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, ChannelError> {
        Self::with_timeout(webhook_url, WEBHOOK_TIMEOUT)
    }

    /// Create a Slack channel with a custom request timeout.
    pub fn with_timeout(
        webhook_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        Ok(Self {
            webhook_url: webhook_url.into(),
            client: http_client(timeout)?,
        })
    }

    /// Map a brand color onto a Slack attachment color.
    fn attachment_color(color: u32) -> &'static str {
        match color {
            0x00D9_7757 => "#D97757", // Claude orange/brown
            0x0010_A37F => "#10A37F", // OpenAI green
            _ => FALLBACK_COLOR,
        }
    }

    /// Format a notification as a Slack webhook payload.
    fn format_payload(notification: &Notification) -> SlackPayload {
        let blocks = vec![
            SlackBlock::Header {
                text: SlackText::plain(notification.heading()),
            },
            SlackBlock::Section {
                text: SlackText::mrkdwn(format!(
                    "*{}*\n\n{}",
                    notification.title,
                    notification.details(MAX_SECTION_CHARS)
                )),
            },
            SlackBlock::Section {
                text: SlackText::mrkdwn(format!(
                    "<{}|View full details on status page>",
                    notification.link
                )),
            },
            SlackBlock::Context {
                elements: vec![SlackText::mrkdwn(notification.footer())],
            },
        ];

        SlackPayload {
            blocks,
            attachments: vec![SlackAttachment {
                color: Self::attachment_color(notification.color).to_string(),
                fallback: format!("{}: {}", notification.service_name, notification.title),
            }],
        }
    }
}

#[async_trait]
impl NotifyChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let payload = Self::format_payload(notification);

        debug!(channel = "slack", service = %notification.service_name, "Sending notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "slack", "Notification sent successfully");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "slack",
                status = %status,
                body = %body,
                "Slack webhook request failed"
            );

            Err(ChannelError::Status { status, body })
        }
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SlackPayload {
    blocks: Vec<SlackBlock>,
    attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackBlock {
    Header { text: SlackText },
    Section { text: SlackText },
    Context { elements: Vec<SlackText> },
}

#[derive(Debug, Serialize)]
struct SlackText {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    emoji: Option<bool>,
}

impl SlackText {
    fn plain(text: String) -> Self {
        Self {
            kind: "plain_text",
            text,
            emoji: Some(true),
        }
    }

    fn mrkdwn(text: String) -> Self {
        Self {
            kind: "mrkdwn",
            text,
            emoji: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SlackAttachment {
    color: String,
    fallback: String,
}
