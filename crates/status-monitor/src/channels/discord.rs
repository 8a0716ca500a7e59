//! Discord webhook notification channel.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{http_client, Notification, NotifyChannel, WEBHOOK_TIMEOUT};
use crate::error::ChannelError;

/// Discord caps embed field values at 1024 characters.
const MAX_FIELD_CHARS: usize = 1024;

/// Discord webhook notification channel.
pub struct DiscordChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordChannel {
    /// Create a Discord channel with a specific webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, ChannelError> {
        Self::with_timeout(webhook_url, WEBHOOK_TIMEOUT)
    }

    /// Create a Discord channel with a custom request timeout.
    pub fn with_timeout(
        webhook_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        Ok(Self {
            webhook_url: webhook_url.into(),
            client: http_client(timeout)?,
        })
    }

    /// Format a notification as a Discord webhook payload.
    fn format_payload(notification: &Notification) -> DiscordPayload {
        let embed = DiscordEmbed {
            title: notification.heading(),
            description: notification.title.clone(),
            url: Some(notification.link.clone()).filter(|l| !l.is_empty()),
            color: notification.color,
            fields: vec![DiscordField {
                name: "Details".to_string(),
                value: notification.details(MAX_FIELD_CHARS),
                inline: false,
            }],
            footer: DiscordFooter {
                text: notification.footer(),
            },
        };

        DiscordPayload {
            embeds: vec![embed],
        }
    }
}

#[async_trait]
impl NotifyChannel for DiscordChannel {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let payload = Self::format_payload(notification);

        debug!(channel = "discord", service = %notification.service_name, "Sending notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "discord", "Notification sent successfully");
            Ok(())
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok())
                .map_or(5, |secs| secs.ceil() as u64);

            warn!(
                channel = "discord",
                retry_after_secs = retry_after,
                "Rate limited by Discord"
            );

            Err(ChannelError::RateLimited {
                retry_after_secs: retry_after,
            })
        } else {
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "discord",
                status = %status,
                body = %body,
                "Discord webhook request failed"
            );

            Err(ChannelError::Status { status, body })
        }
    }
}

// =============================================================================
// Discord API types
// =============================================================================

#[derive(Debug, Serialize)]
struct DiscordPayload {
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    color: u32,
    fields: Vec<DiscordField>,
    footer: DiscordFooter,
}

#[derive(Debug, Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct DiscordFooter {
    text: String,
}
