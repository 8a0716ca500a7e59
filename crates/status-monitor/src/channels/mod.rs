//! Notification channel implementations.
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`DiscordChannel`] and [`SlackChannel`] implement webhook delivery
//! - [`Notifier`] wraps the configured channel and reports delivery as a
//!   plain success flag, so a failed webhook never escapes to the caller

pub mod discord;
pub mod slack;

pub use discord::DiscordChannel;
pub use slack::SlackChannel;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{Config, NotificationType};
use crate::error::ChannelError;

/// Timeout applied to every webhook request.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown when an entry has no description.
const NO_DETAILS: &str = "No additional details";

/// A classified incident ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub service_name: String,
    pub title: String,
    pub description: String,
    pub link: String,
    /// Brand color as 0xRRGGBB.
    pub color: u32,
    /// Rendered in the message footer.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
        color: u32,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            title: title.into(),
            description: description.into(),
            link: link.into(),
            color,
            timestamp: Utc::now(),
        }
    }

    /// Message heading shared by all channels.
    #[must_use]
    pub fn heading(&self) -> String {
        format!("🚨 {} Status Update", self.service_name)
    }

    /// Description cut to `max_chars`, or a placeholder when empty.
    #[must_use]
    pub fn details(&self, max_chars: usize) -> String {
        if self.description.is_empty() {
            NO_DETAILS.to_string()
        } else {
            truncate_chars(&self.description, max_chars)
        }
    }

    /// Footer text shared by all channels.
    #[must_use]
    pub fn footer(&self) -> String {
        format!(
            "LLM Status Monitor • {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Trait for notification channels (Discord, Slack).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver a notification to this channel.
    async fn send(&self, notification: &Notification) -> Result<(), ChannelError>;
}

/// Create the channel for a notification type.
pub fn create_channel(
    kind: NotificationType,
    webhook_url: &str,
) -> Result<Arc<dyn NotifyChannel>, ChannelError> {
    Ok(match kind {
        NotificationType::Discord => Arc::new(DiscordChannel::new(webhook_url)?),
        NotificationType::Slack => Arc::new(SlackChannel::new(webhook_url)?),
    })
}

/// Delivers notifications through one channel, never failing the caller.
pub struct Notifier {
    channel: Arc<dyn NotifyChannel>,
}

impl Notifier {
    #[must_use]
    pub fn new(channel: Arc<dyn NotifyChannel>) -> Self {
        Self { channel }
    }

    /// Build the notifier selected by configuration.
    ///
    /// Returns `Ok(None)` when the selected webhook is not configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, ChannelError> {
        let Some(url) = config.webhook_url() else {
            return Ok(None);
        };

        let channel = create_channel(config.notification_type, url)?;
        info!(channel = channel.name(), "Notifications enabled");
        Ok(Some(Self::new(channel)))
    }

    /// Name of the underlying channel.
    #[must_use]
    pub fn channel_name(&self) -> &'static str {
        self.channel.name()
    }

    /// Send a notification, returning whether delivery was confirmed.
    pub async fn send(&self, notification: &Notification) -> bool {
        let channel = self.channel.name();
        let service = notification.service_name.as_str();

        match self.channel.send(notification).await {
            Ok(()) => {
                info!(channel, service, "Notification sent");
                true
            }
            Err(ChannelError::Timeout) => {
                error!(channel, service, "Notification timed out");
                false
            }
            Err(ChannelError::RateLimited { retry_after_secs }) => {
                warn!(channel, service, retry_after_secs, "Notification rate limited");
                false
            }
            Err(e) => {
                error!(channel, service, error = %e, "Notification failed");
                false
            }
        }
    }
}

/// Build an HTTP client for webhook delivery.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ChannelError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Truncate to at most `max_chars` characters without splitting one.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
