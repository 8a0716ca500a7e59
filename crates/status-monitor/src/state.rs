//! Persistent state tracking the last processed entry per feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::error::StateError;

/// Last observed entry for a single feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    /// ID of the most recent entry evaluated, notified or not.
    pub last_id: String,
    /// Title of that entry.
    pub last_title: String,
    /// When that entry was evaluated.
    pub last_checked: DateTime<Utc>,
}

/// Feed identifier to last observed entry.
pub type StateTable = BTreeMap<String, ServiceState>;

/// JSON-file backed store for [`StateTable`].
///
/// Only [`StateStore::load`] and [`StateStore::save`] touch the disk;
/// [`StateStore::update`] mutates memory only.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    table: StateTable,
}

impl StateStore {
    /// Create an empty store backed by `path`. Nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: StateTable::new(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the in-memory table.
    #[must_use]
    pub fn table(&self) -> &StateTable {
        &self.table
    }

    /// Load state from disk.
    ///
    /// A missing file yields an empty table. An unreadable or malformed file
    /// is logged and also yields an empty table; this never fails.
    pub fn load(&mut self) -> &StateTable {
        if !self.path.exists() {
            info!(path = %self.path.display(), "State file not found, starting fresh");
            self.table = StateTable::new();
            return &self.table;
        }

        self.table = match self.read() {
            Ok(table) => {
                info!(
                    path = %self.path.display(),
                    services = table.len(),
                    "Loaded state"
                );
                table
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to load state file");
                StateTable::new()
            }
        };

        &self.table
    }

    /// Write the whole table to disk.
    ///
    /// Returns `false` on failure; the in-memory table is left intact so the
    /// next cycle can retry.
    pub fn save(&self) -> bool {
        match self.write() {
            Ok(()) => {
                debug!(path = %self.path.display(), "Saved state");
                true
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to save state");
                false
            }
        }
    }

    /// Last entry ID recorded for a feed.
    #[must_use]
    pub fn get_last_id(&self, feed_id: &str) -> Option<&str> {
        self.table.get(feed_id).map(|s| s.last_id.as_str())
    }

    /// Record `entry_id` as the latest evaluated entry for a feed.
    pub fn update(&mut self, feed_id: &str, entry_id: &str, title: &str, now: DateTime<Utc>) {
        self.table.insert(
            feed_id.to_string(),
            ServiceState {
                last_id: entry_id.to_string(),
                last_title: title.to_string(),
                last_checked: now,
            },
        );
        debug!(feed = feed_id, title, "Updated state");
    }

    fn read(&self) -> Result<StateTable, StateError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(&self.table)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write beside the target then rename, so a crash never truncates
        // the previous state.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}
