//! Canonical event model and normalization of remote event records.
//!
//! Remote records arrive in the calendar service's event-resource shape:
//!
//! ```json
//! {
//!   "id": "abc123",
//!   "summary": "Math",
//!   "start": { "dateTime": "2026-10-17T08:00:00+02:00" },
//!   "end":   { "dateTime": "2026-10-17T08:45:00+02:00" },
//!   "description": "Chapter 4",
//!   "location": "Room 101"
//! }
//! ```
//!
//! [`normalize`] turns one record into an [`Event`]; [`normalize_all`]
//! applies the partial-failure policy to a whole day.

use chrono::{DateTime, Duration};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::time::{self, Instant};

/// A remote event record as delivered by a fetch collaborator.
pub type RawEvent = serde_json::Value;

/// How the UTC-offset suffix of a remote timestamp is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    /// Drop the offset and read the wall-clock fields as local time.
    #[default]
    StripOffset,
    /// Shift the wall-clock fields by the signed offset.
    ApplyOffset,
}

/// A calendar event, immutable once constructed.
///
/// Invariant: `end > start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEvent")]
pub struct Event {
    title: String,
    #[serde(rename = "start_epoch_seconds")]
    start: Instant,
    #[serde(rename = "end_epoch_seconds")]
    end: Instant,
    description: String,
    location: String,
    id: String,
}

/// Wire form used when decoding; validated through [`Event::new`].
#[derive(Deserialize)]
struct StoredEvent {
    title: String,
    start_epoch_seconds: Instant,
    end_epoch_seconds: Instant,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    id: String,
}

impl TryFrom<StoredEvent> for Event {
    type Error = EventError;

    fn try_from(stored: StoredEvent) -> Result<Self, Self::Error> {
        Ok(Event::new(
            stored.id,
            stored.title,
            stored.start_epoch_seconds,
            stored.end_epoch_seconds,
        )?
        .with_description(stored.description)
        .with_location(stored.location))
    }
}

impl Event {
    /// Create an event with empty description and location.
    ///
    /// # Errors
    /// Returns [`EventError::InvalidTimeRange`] unless `end > start`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: Instant,
        end: Instant,
    ) -> Result<Self, EventError> {
        let id = id.into();
        if end <= start {
            return Err(EventError::InvalidTimeRange { id, start, end });
        }
        Ok(Self {
            title: title.into(),
            start,
            end,
            description: String::new(),
            location: String::new(),
            id,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Remote identifier. Identity/debugging only, never used for ordering.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Length in seconds.
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether `now` lies in `[start, end)`.
    pub fn contains(&self, now: Instant) -> bool {
        self.start <= now && now < self.end
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            time::to_naive(self.start).format("%Y-%m-%d %H:%M"),
            time::to_naive(self.end).format("%H:%M"),
            self.title
        )
    }
}

/// Parse an RFC 3339 timestamp with explicit offset (`Z` or `±HH:MM`).
///
/// Fractional seconds are accepted and truncated.
pub fn parse_timestamp(value: &str, mode: TimestampMode) -> Option<Instant> {
    let parsed = DateTime::parse_from_rfc3339(value.trim()).ok()?;
    let wall = parsed.naive_local();
    let shifted = match mode {
        TimestampMode::StripOffset => wall,
        TimestampMode::ApplyOffset => {
            wall + Duration::seconds(i64::from(parsed.offset().local_minus_utc()))
        }
    };
    Some(time::from_naive(shifted))
}

fn required_str<'a>(record: &'a RawEvent, field: &'static str) -> Result<&'a str, EventError> {
    record[field]
        .as_str()
        .ok_or(EventError::MissingField { field })
}

fn timestamp_field(
    record: &RawEvent,
    field: &'static str,
    mode: TimestampMode,
) -> Result<Instant, EventError> {
    let value = record[field]["dateTime"]
        .as_str()
        .ok_or(EventError::MissingField { field })?;
    parse_timestamp(value, mode).ok_or_else(|| EventError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}

/// Normalize one remote record.
///
/// `summary`, `start.dateTime`, `end.dateTime` and `id` are required;
/// `description` and `location` default to empty.
///
/// # Errors
/// Returns an [`EventError`] when a required field is absent, a
/// timestamp cannot be parsed, or the event does not end after it starts.
pub fn normalize(record: &RawEvent, mode: TimestampMode) -> Result<Event, EventError> {
    let id = required_str(record, "id")?;
    let title = required_str(record, "summary")?;
    let start = timestamp_field(record, "start", mode)?;
    let end = timestamp_field(record, "end", mode)?;

    let event = Event::new(id, title, start, end)?
        .with_description(record["description"].as_str().unwrap_or_default())
        .with_location(record["location"].as_str().unwrap_or_default());
    Ok(event)
}

/// A normalized day plus the records that had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Events in input order.
    pub events: Vec<Event>,
    /// One entry per dropped record: its `id` if it had one, and why.
    pub dropped: Vec<(Option<String>, EventError)>,
}

impl Normalized {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Normalize a batch, skipping malformed records.
///
/// One bad record never drops the rest of the day.
pub fn normalize_all<'a, I>(records: I, mode: TimestampMode) -> Normalized
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut out = Normalized::default();
    for record in records {
        match normalize(record, mode) {
            Ok(event) => out.events.push(event),
            Err(err) => {
                let id = record["id"].as_str().map(str::to_string);
                tracing::warn!(id = ?id, error = %err, "dropping malformed event record");
                out.dropped.push((id, err));
            }
        }
    }
    out
}
