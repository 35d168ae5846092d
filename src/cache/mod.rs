//! Local key-value cache for timer settings and ticket progress.
//!
//! One JSON file per entry, keyed by user id, stored under the platform
//! data directory. The cache is read on startup and written on every
//! settings change; the ticket-progress snapshot additionally carries a
//! timestamp so a snapshot from a previous day is ignored on load.

pub mod error;

pub use error::CacheError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{epoch_day, TimerConfig};

// ============================================================================
// Cached entries
// ============================================================================

/// On-disk form of the timer settings entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsEntry {
    config: TimerConfig,
    last_updated: u64,
}

/// On-disk form of the daily ticket-progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketProgressEntry {
    progress: u32,
    timestamp: u64,
}

// ============================================================================
// ProgressCache
// ============================================================================

/// File-backed cache, one directory per install.
#[derive(Debug, Clone)]
pub struct ProgressCache {
    dir: PathBuf,
}

impl ProgressCache {
    /// Opens a cache rooted at the given directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Opens the cache at the platform default location.
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(Self::default_dir()?)
    }

    /// Platform default cache directory.
    pub fn default_dir() -> Result<PathBuf, CacheError> {
        dirs::data_dir()
            .map(|dir| dir.join("pomoquest"))
            .ok_or(CacheError::NoCacheDir)
    }

    /// Directory this cache writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn settings_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("timer_settings_{user_id}.json"))
    }

    fn ticket_progress_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("ticket_progress_{user_id}.json"))
    }

    /// Persists the timer configuration for a user.
    pub fn save_timer_config(
        &self,
        user_id: &str,
        config: &TimerConfig,
        now: u64,
    ) -> Result<(), CacheError> {
        let entry = SettingsEntry {
            config: *config,
            last_updated: now,
        };
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.settings_path(user_id), json)?;
        debug!(user_id, "timer settings cached");
        Ok(())
    }

    /// Loads the cached timer configuration for a user, if any.
    ///
    /// A missing or unreadable entry yields `Ok(None)`; the caller falls
    /// back to defaults.
    pub fn load_timer_config(&self, user_id: &str) -> Result<Option<TimerConfig>, CacheError> {
        let path = self.settings_path(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        let entry: SettingsEntry = serde_json::from_str(&json)?;
        Ok(Some(entry.config))
    }

    /// Persists the daily ticket-progress snapshot for a user.
    pub fn save_ticket_progress(
        &self,
        user_id: &str,
        progress: u32,
        now: u64,
    ) -> Result<(), CacheError> {
        let entry = TicketProgressEntry {
            progress,
            timestamp: now,
        };
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.ticket_progress_path(user_id), json)?;
        debug!(user_id, progress, "ticket progress cached");
        Ok(())
    }

    /// Loads the ticket-progress snapshot for a user.
    ///
    /// Returns `Ok(None)` when no snapshot exists or the snapshot was taken
    /// on a different UTC day than `now`.
    pub fn load_ticket_progress(
        &self,
        user_id: &str,
        now: u64,
    ) -> Result<Option<u32>, CacheError> {
        let path = self.ticket_progress_path(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        let entry: TicketProgressEntry = serde_json::from_str(&json)?;
        if epoch_day(entry.timestamp) == epoch_day(now) {
            Ok(Some(entry.progress))
        } else {
            debug!(user_id, "stale ticket progress snapshot ignored");
            Ok(None)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache() -> (TempDir, ProgressCache) {
        let dir = TempDir::new().unwrap();
        let cache = ProgressCache::open(dir.path()).unwrap();
        (dir, cache)
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let cache = ProgressCache::open(&nested).unwrap();
        assert!(cache.dir().exists());
    }

    #[test]
    fn test_timer_config_round_trip() {
        let (_dir, cache) = cache();
        let config = TimerConfig::default().with_focus_minutes(45);

        cache.save_timer_config("user-a", &config, 1000).unwrap();
        let loaded = cache.load_timer_config("user-a").unwrap();
        assert_eq!(loaded, Some(config));
    }

    #[test]
    fn test_load_timer_config_absent() {
        let (_dir, cache) = cache();
        assert_eq!(cache.load_timer_config("nobody").unwrap(), None);
    }

    #[test]
    fn test_settings_are_per_user() {
        let (_dir, cache) = cache();
        let a = TimerConfig::default().with_focus_minutes(30);
        let b = TimerConfig::default().with_focus_minutes(60);

        cache.save_timer_config("user-a", &a, 1000).unwrap();
        cache.save_timer_config("user-b", &b, 1000).unwrap();

        assert_eq!(cache.load_timer_config("user-a").unwrap(), Some(a));
        assert_eq!(cache.load_timer_config("user-b").unwrap(), Some(b));
    }

    #[test]
    fn test_ticket_progress_same_day() {
        let (_dir, cache) = cache();
        let noon = 86_400 * 100 + 43_200;
        let evening = 86_400 * 100 + 80_000;

        cache.save_ticket_progress("user-a", 2, noon).unwrap();
        assert_eq!(
            cache.load_ticket_progress("user-a", evening).unwrap(),
            Some(2)
        );
    }

    #[test]
    fn test_ticket_progress_stale_day_ignored() {
        let (_dir, cache) = cache();
        let yesterday = 86_400 * 100;
        let tomorrow = 86_400 * 101;

        cache.save_ticket_progress("user-a", 2, yesterday).unwrap();
        assert_eq!(
            cache.load_ticket_progress("user-a", tomorrow).unwrap(),
            None
        );
    }

    #[test]
    fn test_ticket_progress_absent() {
        let (_dir, cache) = cache();
        assert_eq!(cache.load_ticket_progress("nobody", 0).unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let (_dir, cache) = cache();
        fs::write(cache.dir().join("timer_settings_user-a.json"), "not json").unwrap();
        assert!(cache.load_timer_config("user-a").is_err());
    }
}
