//! HTTP feed source backed by `feed-rs`.

use async_trait::async_trait;
use feed_rs::model::Feed;
use feed_rs::parser;
use std::time::Duration;
use tracing::{debug, warn};

use super::{clean_html, FeedEntry, FeedSource, DEFAULT_TITLE};
use crate::error::FeedError;

/// Timeout for fetching a feed document.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("status-monitor/", env!("CARGO_PKG_VERSION"));

/// Fetches feeds over HTTP and parses RSS, Atom or JSON Feed.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn latest_entry(&self, url: &str) -> Result<Option<FeedEntry>, FeedError> {
        debug!(url, "Fetching feed");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let feed = parse_feed(body.as_ref())?;

        if feed.entries.is_empty() {
            warn!(url, "No entries found in feed");
        }

        latest_entry(feed, url)
    }
}

/// Parse a feed document.
///
/// Entries without an id keep an empty one instead of the hash feed-rs
/// would derive from link and title, so [`latest_entry`] can fall back to
/// the link and an edited title never looks like a new entry.
pub fn parse_feed(body: &[u8]) -> Result<Feed, FeedError> {
    parser::Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build()
        .parse(body)
        .map_err(|e| FeedError::Parse(e.to_string()))
}

/// Extract the newest entry of a parsed feed.
///
/// Entries are in document order, newest first. When the entry has no link
/// the feed URL is used, so notifications always point somewhere useful.
pub fn latest_entry(feed: Feed, feed_url: &str) -> Result<Option<FeedEntry>, FeedError> {
    let Some(latest) = feed.entries.into_iter().next() else {
        return Ok(None);
    };

    let link = latest.links.first().map(|l| l.href.clone());

    let id = if latest.id.trim().is_empty() {
        link.clone().filter(|l| !l.trim().is_empty())
    } else {
        Some(latest.id)
    };
    let Some(id) = id else {
        return Err(FeedError::MissingId);
    };

    let title = latest
        .title
        .map(|t| t.content)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let description = latest
        .summary
        .map(|s| s.content)
        .or_else(|| latest.content.and_then(|c| c.body))
        .map(|d| clean_html(&d))
        .unwrap_or_default();

    let published = latest
        .published
        .or(latest.updated)
        .map(|d| d.to_rfc3339());

    Ok(Some(FeedEntry {
        id,
        title,
        description,
        link: link.unwrap_or_else(|| feed_url.to_string()),
        published,
    }))
}
