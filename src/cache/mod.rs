//! Metrics cache.
//!
//! Holds one derived value (the time since the most recent entry) in a small
//! JSON file so that frequent callers such as shell prompts avoid a network
//! round trip. A record is usable for [`CACHE_TTL`] after it was saved; when
//! it is read back, the time elapsed since saving is added to the value.
//!
//! Concurrent writers are not coordinated. Each write replaces the whole
//! file, so the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};
use crate::paths::cache_dir;

/// How long a saved record may be served.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// File name of the time-since record inside the cache directory.
pub const TIME_SINCE_CACHE: &str = "timesince.cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub saved_at: Timestamp,
    pub value: Duration,
}

impl CacheRecord {
    /// The record's value as of `now`, or `None` if it has expired or the
    /// aged value does not fit in a `Duration`.
    ///
    /// Records saved in the future (clock changes) are treated as expired.
    pub fn value_at(&self, now: Timestamp, ttl: Duration) -> Option<Duration> {
        let age = Duration::try_from(now.duration_since(self.saved_at)).ok()?;
        if age > ttl {
            return None;
        }
        self.value.checked_add(age)
    }
}

#[derive(Debug, Clone)]
pub struct MetricsCache {
    path: PathBuf,
    ttl: Duration,
}

impl MetricsCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: CACHE_TTL,
        }
    }

    /// The cache for the time-since-last-entry metric.
    pub fn time_since() -> Result<Self> {
        Ok(Self::new(cache_dir()?.join(TIME_SINCE_CACHE)))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw record, if a well-formed one exists.
    pub fn read_record(&self) -> Result<CacheRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(JournalError::CacheMiss);
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "cache unreadable");
                return Err(JournalError::CacheMiss);
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(path = %self.path.display(), error = %e, "cache record corrupt");
            JournalError::CacheMiss
        })
    }

    /// Load the current value, or [`JournalError::CacheMiss`] if there is no
    /// fresh record.
    pub fn load(&self, now: Timestamp) -> Result<Duration> {
        let record = self.read_record()?;
        match record.value_at(now, self.ttl) {
            Some(value) => {
                tracing::debug!(saved_at = %record.saved_at, "cache hit");
                Ok(value)
            }
            None => {
                tracing::debug!(saved_at = %record.saved_at, "cache stale");
                Err(JournalError::CacheMiss)
            }
        }
    }

    /// Replace the stored record.
    pub fn store(&self, value: Duration, now: Timestamp) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let record = CacheRecord {
            saved_at: now,
            value,
        };
        fs::write(&self.path, serde_json::to_vec(&record)?)?;
        Ok(())
    }
}
