//! Configuration for the status monitor.
//!
//! Built once at startup from environment variables (and `.env`, if
//! present), then passed by reference to everything that needs it.
//!
//! # Environment Variables
//! - `NOTIFICATION_TYPE`: `discord` or `slack` (default: discord)
//! - `DISCORD_WEBHOOK_URL`: Discord webhook URL
//! - `SLACK_WEBHOOK_URL`: Slack webhook URL
//! - `CHECK_INTERVAL`: Seconds between cycles (default: 300)
//! - `STATE_FILE`: Path of the state file (default: data/state.json)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::error::ConfigError;

/// Default seconds between check cycles.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

/// Intervals below this are allowed but logged as suspicious.
pub const MIN_SANE_INTERVAL_SECS: u64 = 10;

/// Default state file location.
pub const DEFAULT_STATE_FILE: &str = "data/state.json";

const ENV_NOTIFICATION_TYPE: &str = "NOTIFICATION_TYPE";
const ENV_DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
const ENV_CHECK_INTERVAL: &str = "CHECK_INTERVAL";
const ENV_STATE_FILE: &str = "STATE_FILE";

/// Status feeds monitored by default.
pub const FEEDS: &[FeedDescriptor] = &[
    FeedDescriptor {
        id: "claude",
        name: "Anthropic (Claude)",
        url: "https://status.claude.com/history.rss",
        color: 0x00D9_7757, // Orange/brown
    },
    FeedDescriptor {
        id: "chatgpt",
        name: "OpenAI (ChatGPT)",
        url: "https://status.openai.com/history.rss",
        color: 0x0010_A37F, // Green
    },
];

/// A monitored status feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedDescriptor {
    /// Key used in the state file.
    pub id: &'static str,
    /// Display name used in notifications.
    pub name: &'static str,
    /// RSS feed URL.
    pub url: &'static str,
    /// Brand color as 0xRRGGBB.
    pub color: u32,
}

/// Supported notification sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Discord,
    Slack,
}

impl NotificationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Slack => "slack",
        }
    }

    /// Name of the environment variable holding this sink's webhook URL.
    #[must_use]
    pub const fn webhook_env(&self) -> &'static str {
        match self {
            Self::Discord => ENV_DISCORD_WEBHOOK_URL,
            Self::Slack => ENV_SLACK_WEBHOOK_URL,
        }
    }
}

impl FromStr for NotificationType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "slack" => Ok(Self::Slack),
            other => Err(ConfigError::InvalidNotificationType(other.to_string())),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub notification_type: NotificationType,
    pub discord_webhook: Option<String>,
    pub slack_webhook: Option<String>,
    pub check_interval: Duration,
    pub state_file: PathBuf,
    pub feeds: Vec<FeedDescriptor>,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let notification_type: NotificationType = lookup(ENV_NOTIFICATION_TYPE)
            .unwrap_or_else(|| "discord".to_string())
            .parse()?;

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let discord_webhook = non_empty(ENV_DISCORD_WEBHOOK_URL);
        let slack_webhook = non_empty(ENV_SLACK_WEBHOOK_URL);

        let check_interval_secs = match lookup(ENV_CHECK_INTERVAL) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidInterval { value, source })?,
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };

        let state_file =
            PathBuf::from(lookup(ENV_STATE_FILE).unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()));

        let config = Self {
            notification_type,
            discord_webhook,
            slack_webhook,
            check_interval: Duration::from_secs(check_interval_secs),
            state_file,
            feeds: FEEDS.to_vec(),
        };

        if !config.is_configured() {
            warn!(
                notification_type = %notification_type,
                "NOTIFICATION_TYPE is '{}' but {} is not set",
                notification_type,
                notification_type.webhook_env()
            );
        }

        if check_interval_secs < MIN_SANE_INTERVAL_SECS {
            warn!(
                check_interval_secs,
                "CHECK_INTERVAL is very low. Consider using at least 60 seconds."
            );
        }

        Ok(config)
    }

    /// Webhook URL for the selected notification type.
    #[must_use]
    pub fn webhook_url(&self) -> Option<&str> {
        match self.notification_type {
            NotificationType::Discord => self.discord_webhook.as_deref(),
            NotificationType::Slack => self.slack_webhook.as_deref(),
        }
    }

    /// Whether the selected notification type has a webhook.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.webhook_url().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.notification_type, NotificationType::Discord);
        assert_eq!(config.check_interval, Duration::from_secs(300));
        assert_eq!(config.state_file, PathBuf::from("data/state.json"));
        assert!(!config.is_configured());
        assert_eq!(config.feeds.len(), 2);
    }

    #[test]
    fn test_feeds_configuration() {
        let ids: Vec<_> = FEEDS.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["claude", "chatgpt"]);
        assert_eq!(FEEDS[0].name, "Anthropic (Claude)");
        assert_eq!(FEEDS[0].color, 0xD9_7757);
        assert_eq!(FEEDS[1].name, "OpenAI (ChatGPT)");
        assert_eq!(FEEDS[1].color, 0x10_A37F);
    }

    #[test]
    fn test_discord_configured() {
        let config = config_from(&[
            ("NOTIFICATION_TYPE", "discord"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/webhook"),
        ])
        .unwrap();

        assert!(config.is_configured());
        assert_eq!(config.webhook_url(), Some("https://discord.com/webhook"));
    }

    #[test]
    fn test_slack_configured_case_insensitive() {
        let config = config_from(&[
            ("NOTIFICATION_TYPE", "SLACK"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/webhook"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/webhook"),
        ])
        .unwrap();

        assert_eq!(config.notification_type, NotificationType::Slack);
        assert_eq!(config.webhook_url(), Some("https://hooks.slack.com/webhook"));
    }

    #[test]
    fn test_webhook_for_other_type_is_not_used() {
        let config = config_from(&[
            ("NOTIFICATION_TYPE", "slack"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/webhook"),
        ])
        .unwrap();

        assert!(!config.is_configured());
    }

    #[test]
    fn test_blank_webhook_is_unset() {
        let config = config_from(&[("DISCORD_WEBHOOK_URL", "  ")]).unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_invalid_notification_type() {
        let err = config_from(&[("NOTIFICATION_TYPE", "invalid")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNotificationType(ref t) if t == "invalid"));
        assert!(err.to_string().contains("Invalid NOTIFICATION_TYPE"));
    }

    #[test]
    fn test_custom_check_interval() {
        let config = config_from(&[("CHECK_INTERVAL", "600")]).unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_low_check_interval_is_accepted() {
        let config = config_from(&[("CHECK_INTERVAL", "5")]).unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_check_interval() {
        let err = config_from(&[("CHECK_INTERVAL", "often")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInterval { .. }));
    }

    #[test]
    fn test_custom_state_file() {
        let config = config_from(&[("STATE_FILE", "/tmp/monitor/state.json")]).unwrap();
        assert_eq!(config.state_file, PathBuf::from("/tmp/monitor/state.json"));
    }
}
