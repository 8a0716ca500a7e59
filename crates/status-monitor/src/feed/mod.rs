//! Status feed retrieval.
//!
//! [`FeedSource`] is the seam between the monitor and the network: given a
//! feed URL it returns the newest entry, already reduced to plain text.
//! [`HttpFeedSource`] is the production implementation.

mod http;

pub use http::{latest_entry, parse_feed, HttpFeedSource};

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::FeedError;

/// Title used when an entry has none.
pub const DEFAULT_TITLE: &str = "Status Update";

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());

/// The newest entry of a status feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Stable identifier (entry id, or link when the feed has none).
    pub id: String,
    pub title: String,
    /// Summary with HTML tags removed.
    pub description: String,
    pub link: String,
    /// Publication (or last update) time as RFC 3339.
    pub published: Option<String>,
}

/// Source of status feed entries.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the newest entry of the feed at `url`.
    ///
    /// Returns `Ok(None)` when the feed is reachable but has no entries.
    async fn latest_entry(&self, url: &str) -> Result<Option<FeedEntry>, FeedError>;
}

/// Remove HTML tags from text and trim surrounding whitespace.
#[must_use]
pub fn clean_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").trim().to_string()
}
