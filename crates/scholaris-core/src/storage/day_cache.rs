//! Single-day event cache on disk.
//!
//! One JSON record per cache directory:
//!
//! ```json
//! {
//!   "version": 1,
//!   "cached_date": "2026-10-17",
//!   "events": [
//!     { "title": "Math", "start_epoch_seconds": 1792224000,
//!       "end_epoch_seconds": 1792226700, "description": "",
//!       "location": "Room 101", "id": "evt-1" }
//!   ]
//! }
//! ```
//!
//! Writes go to a sibling temp file that is then renamed over the
//! record, so a crash mid-write leaves either the old record or an
//! unreadable temp file behind. Reads treat anything they cannot decode
//! as a miss.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::schedule::DaySchedule;

/// File name of the cache record inside the cache directory.
pub const CACHE_FILE: &str = "event_cache.json";

const CACHE_VERSION: u32 = 1;

/// A cached day: the date it was fetched for and its ordered events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cached_date: NaiveDate,
    pub events: DaySchedule,
}

#[derive(Serialize, Deserialize)]
struct CacheRecord {
    version: u32,
    cached_date: NaiveDate,
    events: DaySchedule,
}

/// Persisted store for exactly one day's schedule.
///
/// Not safe for concurrent writers; one process per user is assumed.
#[derive(Debug)]
pub struct DayCache {
    path: PathBuf,
    held: Option<CacheEntry>,
}

impl DayCache {
    /// Cache living in `dir`. Nothing is touched until the first read or write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_FILE),
            held: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Entry held in memory from the last successful read or write.
    pub fn held(&self) -> Option<&CacheEntry> {
        self.held.as_ref()
    }

    /// Load whatever record is on disk, regardless of its date.
    ///
    /// # Errors
    /// Returns a [`CacheError`] if the file exists but cannot be read or
    /// decoded. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<CacheEntry>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let record: CacheRecord = serde_json::from_str(&content).map_err(CacheError::Decode)?;
        if record.version != CACHE_VERSION {
            return Err(CacheError::UnsupportedVersion(record.version));
        }
        Ok(Some(CacheEntry {
            cached_date: record.cached_date,
            events: record.events,
        }))
    }

    /// Events cached for `today`, or `None` when missing, stale or unreadable.
    pub fn read(&mut self, today: NaiveDate) -> Option<DaySchedule> {
        if let Some(entry) = self.held.as_ref().filter(|e| e.cached_date == today) {
            tracing::debug!(%today, "day cache hit (memory)");
            return Some(entry.events.clone());
        }

        match self.load() {
            Ok(Some(entry)) if entry.cached_date == today => {
                tracing::debug!(%today, events = entry.events.len(), "day cache hit");
                let events = entry.events.clone();
                self.held = Some(entry);
                Some(events)
            }
            Ok(Some(entry)) => {
                tracing::debug!(%today, cached_date = %entry.cached_date, "day cache stale");
                None
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no day cache");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "day cache unreadable, treating as miss");
                None
            }
        }
    }

    /// Replace the record with `events` for `today`.
    ///
    /// Events are ordered before they are stored.
    ///
    /// # Errors
    /// Returns a [`CacheError`] if the record cannot be encoded, written
    /// or moved into place. The previous record is left untouched then.
    pub fn write(
        &mut self,
        today: NaiveDate,
        events: impl Into<DaySchedule>,
    ) -> Result<(), CacheError> {
        let record = CacheRecord {
            version: CACHE_VERSION,
            cached_date: today,
            events: events.into(),
        };
        let content = serde_json::to_string_pretty(&record).map_err(CacheError::Encode)?;

        let write_err = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, content).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;

        tracing::info!(%today, events = record.events.len(), "day cache updated");
        self.held = Some(CacheEntry {
            cached_date: record.cached_date,
            events: record.events,
        });
        Ok(())
    }

    /// Delete the record. Deleting an absent record is not an error.
    ///
    /// # Errors
    /// Returns [`CacheError::Remove`] if the file exists but cannot be removed.
    pub fn invalidate(&mut self) -> Result<(), CacheError> {
        self.held = None;
        for path in [self.temp_path(), self.path.clone()] {
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "removed day cache"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(CacheError::Remove { path, source }),
            }
        }
        Ok(())
    }
}
