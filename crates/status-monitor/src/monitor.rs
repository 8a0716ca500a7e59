//! Status monitor - orchestrates the fetch-classify-notify-persist cycle.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::channels::{Notification, Notifier};
use crate::classifier::classify;
use crate::config::{Config, FeedDescriptor};
use crate::error::FeedError;
use crate::feed::{FeedEntry, FeedSource};
use crate::state::StateStore;

/// What happened to a single feed during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Feed was reachable but had no entries.
    Empty,
    /// Latest entry was already processed in an earlier cycle.
    Unchanged,
    /// New entry that is a resolution or routine update.
    NewEntry,
    /// New entry describing an active incident.
    ///
    /// `delivered` is `None` when no notifier is configured.
    Incident { delivered: Option<bool> },
}

/// Result of a single check cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Feeds whose latest entry was fetched.
    pub checked: usize,
    /// Feeds skipped because they were empty, unreachable, or failed.
    pub skipped: usize,
    /// Entries seen for the first time.
    pub new_entries: usize,
    /// New entries classified as active incidents.
    pub incidents: usize,
    /// Notifications confirmed by the webhook.
    pub notified: usize,
    /// Notifications that failed to deliver.
    pub failed: usize,
    /// Per-feed errors encountered.
    pub errors: Vec<String>,
    /// Whether the end-of-cycle save succeeded.
    pub state_saved: bool,
}

impl CycleReport {
    fn record(&mut self, outcome: FeedOutcome) {
        match outcome {
            FeedOutcome::Empty => self.skipped += 1,
            FeedOutcome::Unchanged => self.checked += 1,
            FeedOutcome::NewEntry => {
                self.checked += 1;
                self.new_entries += 1;
            }
            FeedOutcome::Incident { delivered } => {
                self.checked += 1;
                self.new_entries += 1;
                self.incidents += 1;
                match delivered {
                    Some(true) => self.notified += 1,
                    Some(false) => self.failed += 1,
                    None => {}
                }
            }
        }
    }
}

/// Polls status feeds and alerts on new active incidents.
///
/// Each feed entry is evaluated at most once: state advances whenever a new
/// entry id is seen, whether or not a notification was sent or delivered.
pub struct StatusMonitor<'a> {
    config: &'a Config,
    source: Arc<dyn FeedSource>,
    notifier: Option<Notifier>,
    state: StateStore,
}

impl<'a> StatusMonitor<'a> {
    #[must_use]
    pub fn new(config: &'a Config, source: Arc<dyn FeedSource>, notifier: Option<Notifier>) -> Self {
        Self {
            config,
            source,
            notifier,
            state: StateStore::new(config.state_file.clone()),
        }
    }

    /// State store backing this monitor.
    #[must_use]
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Load persisted state. Called once before the first cycle.
    pub fn load_state(&mut self) {
        self.state.load();
    }

    /// Check a single feed for a new entry.
    pub async fn check_feed(&mut self, feed: &FeedDescriptor) -> Result<FeedOutcome, FeedError> {
        info!(feed = feed.id, "Checking {}", feed.name);

        let Some(entry) = self.source.latest_entry(feed.url).await? else {
            warn!(feed = feed.id, "No entries found for {}", feed.name);
            return Ok(FeedOutcome::Empty);
        };

        if self.state.get_last_id(feed.id) == Some(entry.id.as_str()) {
            debug!(feed = feed.id, "No new updates for {}", feed.name);
            return Ok(FeedOutcome::Unchanged);
        }

        info!(
            feed = feed.id,
            entry_id = %entry.id,
            title = %entry.title,
            "New status update for {}",
            feed.name
        );

        let classification = classify(&entry.title, &entry.description);
        let outcome = if classification.is_active() {
            warn!(
                feed = feed.id,
                keyword = classification.keyword(),
                "Active incident detected for {}",
                feed.name
            );
            FeedOutcome::Incident {
                delivered: self.dispatch(feed, &entry).await,
            }
        } else {
            info!(
                feed = feed.id,
                keyword = classification.keyword(),
                "Status update is a resolution/normal status - skipping notification"
            );
            FeedOutcome::NewEntry
        };

        // Advance regardless of delivery so the entry is never re-evaluated
        self.state
            .update(feed.id, &entry.id, &entry.title, Utc::now());

        Ok(outcome)
    }

    async fn dispatch(&self, feed: &FeedDescriptor, entry: &FeedEntry) -> Option<bool> {
        let Some(notifier) = &self.notifier else {
            warn!(feed = feed.id, "Notifier not configured, skipping notification");
            return None;
        };

        let notification = Notification::new(
            feed.name,
            entry.title.as_str(),
            entry.description.as_str(),
            entry.link.as_str(),
            feed.color,
        );

        let delivered = notifier.send(&notification).await;
        if delivered {
            info!(feed = feed.id, "Notification sent for {}", feed.name);
        } else {
            error!(feed = feed.id, "Failed to send notification for {}", feed.name);
        }
        Some(delivered)
    }

    /// Run a single check cycle over all configured feeds, then save state.
    pub async fn run_check_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();
        info!(
            feeds = self.config.feeds.len(),
            "Check started at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );

        let config = self.config;
        for feed in &config.feeds {
            let result = AssertUnwindSafe(self.check_feed(feed)).catch_unwind().await;

            match result {
                Ok(Ok(outcome)) => report.record(outcome),
                Ok(Err(e)) => {
                    error!(feed = feed.id, error = %e, "Failed to check {}", feed.name);
                    report.skipped += 1;
                    report.errors.push(format!("{}: {e}", feed.id));
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(
                        feed = feed.id,
                        panic = %message,
                        "Unexpected error checking {}",
                        feed.name
                    );
                    report.skipped += 1;
                    report.errors.push(format!("{}: {message}", feed.id));
                }
            }
        }

        report.state_saved = self.state.save();

        info!(
            checked = report.checked,
            skipped = report.skipped,
            new_entries = report.new_entries,
            incidents = report.incidents,
            notified = report.notified,
            failed = report.failed,
            errors = report.errors.len(),
            state_saved = report.state_saved,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Check cycle completed. Next check in {}s",
            self.config.check_interval.as_secs()
        );

        report
    }

    /// Run cycles until `shutdown` resolves, then save state one last time.
    ///
    /// Both the cycle and the sleep between cycles are interrupted as soon
    /// as `shutdown` completes. Returns whether the final save succeeded.
    pub async fn run<F>(&mut self, shutdown: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let feed_names: Vec<_> = self.config.feeds.iter().map(|f| f.name).collect();
        info!(
            check_interval_secs = self.config.check_interval.as_secs(),
            feeds = %feed_names.join(", "),
            notification_type = %self.config.notification_type,
            "Status monitor started"
        );

        if self.notifier.is_none() {
            warn!("Running with notifications disabled");
        }

        self.load_state();

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = self.run_check_cycle() => {}
            }

            tokio::select! {
                () = &mut shutdown => break,
                () = tokio::time::sleep(self.config.check_interval) => {}
            }
        }

        info!("Monitor stopped, saving state");
        self.state.save()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
