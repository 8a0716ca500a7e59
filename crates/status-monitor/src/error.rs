//! Error types for the status monitor.

use thiserror::Error;

/// Errors raised while building configuration. These are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `NOTIFICATION_TYPE` is not one of the supported sinks
    #[error("Invalid NOTIFICATION_TYPE: {0}. Must be 'discord' or 'slack'")]
    InvalidNotificationType(String),

    /// `CHECK_INTERVAL` is not a whole number of seconds
    #[error("Invalid CHECK_INTERVAL: {value}")]
    InvalidInterval {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Errors that can occur when fetching or parsing a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed server answered with a non-success status
    #[error("{url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Body could not be parsed as RSS/Atom
    #[error("Failed to parse feed: {0}")]
    Parse(String),

    /// Latest entry carries neither an id nor a link
    #[error("Feed entry has no ID or link")]
    MissingId,
}

/// Errors that can occur when sending notifications.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Request exceeded the webhook timeout
    #[error("Request timed out")]
    Timeout,

    /// Webhook answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors reading or writing the state file.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state JSON: {0}")]
    Json(#[from] serde_json::Error),
}
