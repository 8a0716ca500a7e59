//! Status page monitor for LLM providers.
//!
//! Polls provider status RSS feeds, detects new entries, classifies them as
//! active incidents or resolutions, and alerts a Discord or Slack webhook
//! for active incidents only. Each entry is evaluated exactly once; the last
//! seen entry per feed is persisted across restarts.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use status_monitor::{Config, HttpFeedSource, Notifier, StatusMonitor};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let source = Arc::new(HttpFeedSource::new()?);
//! let notifier = Notifier::from_config(&config)?;
//!
//! let mut monitor = StatusMonitor::new(&config, source, notifier);
//! monitor.run(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`FeedSource`] fetches the newest entry of a feed
//! - [`classify`] decides whether an entry is an active incident
//! - [`NotifyChannel`] delivers alerts; [`Notifier`] wraps the configured one
//! - [`StateStore`] remembers the last processed entry per feed
//! - [`StatusMonitor`] drives the cycle

pub mod channels;
pub mod classifier;
pub mod config;
pub mod error;
pub mod feed;
pub mod monitor;
pub mod state;

pub use channels::{DiscordChannel, Notification, Notifier, NotifyChannel, SlackChannel};
pub use classifier::{classify, is_active_incident, Classification};
pub use config::{Config, FeedDescriptor, NotificationType, FEEDS};
pub use error::{ChannelError, ConfigError, FeedError, StateError};
pub use feed::{FeedEntry, FeedSource, HttpFeedSource};
pub use monitor::{CycleReport, FeedOutcome, StatusMonitor};
pub use state::{ServiceState, StateStore};
