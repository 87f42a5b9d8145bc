//! Offline calendar mirror.
//!
//! Reads calendar-service responses saved to a directory:
//!
//! - `calendarList.json`: `{"items": [{"id": ..., "summary": ...}]}`
//! - `<calendar id>.json`: an events-list response, `{"items": [...]}`
//!
//! Without `calendarList.json` the events come from `events.json`.

use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use super::calendar_select::{choose_calendar, CalendarListEntry};
use super::traits::DayFetcher;
use crate::error::FetchError;
use crate::event::RawEvent;

const CALENDAR_LIST_FILE: &str = "calendarList.json";
const DEFAULT_EVENTS_FILE: &str = "events.json";

/// Fetches a day's events from a directory of saved responses.
#[derive(Debug, Clone)]
pub struct MirrorFetcher {
    dir: PathBuf,
    hotwords: Vec<String>,
}

#[derive(serde::Deserialize)]
struct ListResponse<T> {
    items: Option<Vec<T>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FetchError> {
    let content = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| FetchError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether a raw record starts on `day` (`YYYY-MM-DD` prefix of its start).
///
/// Records without any start are kept so normalization can count them.
fn starts_on(record: &RawEvent, day: &str) -> bool {
    let start = &record["start"];
    match start["dateTime"].as_str().or_else(|| start["date"].as_str()) {
        Some(value) => value.starts_with(day),
        None => true,
    }
}

/// Whether `id` names exactly one ordinary path component.
fn is_plain_file_name(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !id.contains(['/', '\\'])
}

impl MirrorFetcher {
    pub fn new(dir: impl Into<PathBuf>, hotwords: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            hotwords,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the events file for the chosen calendar.
    ///
    /// # Errors
    /// Returns [`FetchError::CalendarNotFound`] for an empty calendar list,
    /// [`FetchError::InvalidCalendarId`] if the chosen id would leave the
    /// mirror directory, or an IO/JSON error if the list cannot be read.
    pub fn events_path(&self) -> Result<PathBuf, FetchError> {
        let list_path = self.dir.join(CALENDAR_LIST_FILE);
        if !list_path.exists() {
            return Ok(self.dir.join(DEFAULT_EVENTS_FILE));
        }

        let list: ListResponse<CalendarListEntry> = read_json(&list_path)?;
        let calendars = list.items.unwrap_or_default();
        tracing::debug!(count = calendars.len(), "found calendars");
        let calendar = choose_calendar(&calendars, self.hotwords.as_slice())
            .ok_or(FetchError::CalendarNotFound)?;
        if !is_plain_file_name(&calendar.id) {
            return Err(FetchError::InvalidCalendarId(calendar.id.clone()));
        }
        Ok(self.dir.join(format!("{}.json", calendar.id)))
    }
}

impl DayFetcher for MirrorFetcher {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEvent>, FetchError> {
        let path = self.events_path()?;
        let response: ListResponse<RawEvent> = read_json(&path)?;
        let Some(items) = response.items else {
            return Ok(Vec::new());
        };

        let day = date.format("%Y-%m-%d").to_string();
        let records: Vec<RawEvent> = items
            .into_iter()
            .filter(|record| starts_on(record, &day))
            .collect();
        tracing::info!(%date, path = %path.display(), records = records.len(), "fetched day");
        Ok(records)
    }
}
