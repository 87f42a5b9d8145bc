//! Core error types for scholaris-core.
//!
//! Every failure in the core is recoverable at the schedule service
//! boundary. The enums here exist so callers (and tests) can tell the
//! cases apart; none of them is meant to terminate the host process.

use std::path::PathBuf;
use thiserror::Error;

use crate::time::Instant;

/// Core error type for scholaris-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A remote event record could not be normalized
    #[error("Malformed event: {0}")]
    Event(#[from] EventError),

    /// Day cache read/write failures
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Fetch collaborator failures
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Resolver input violated its ordering assumptions
    #[error("Internal consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single remote record that cannot become an [`Event`](crate::Event).
///
/// The record is dropped; the rest of the day is kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A required field is absent or not a string
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A timestamp field is present but unparsable
    #[error("invalid timestamp in '{field}': {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// End does not come after start
    #[error("event '{id}' ends ({end}) before or when it starts ({start})")]
    InvalidTimeRange { id: String, start: Instant, end: Instant },
}

/// Day cache errors.
///
/// Read-side variants are turned into cache misses by
/// [`DayCache::read`](crate::DayCache::read); write-side variants are
/// reported and the in-memory schedule is used for the rest of the run.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache file exists but could not be read
    #[error("Failed to read cache at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be written or replaced
    #[error("Failed to write cache at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be removed
    #[error("Failed to remove cache at {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache contents are not a valid record
    #[error("Corrupt cache record: {0}")]
    Decode(#[source] serde_json::Error),

    /// Record could not be serialized
    #[error("Failed to encode cache record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Record was written by an incompatible format version
    #[error("Unsupported cache format version {0}")]
    UnsupportedVersion(u32),
}

impl CacheError {
    /// True for failures on the write path.
    pub fn is_write(&self) -> bool {
        matches!(self, CacheError::Write { .. } | CacheError::Encode(_))
    }
}

/// Errors raised by a [`DayFetcher`](crate::integrations::DayFetcher).
#[derive(Error, Debug)]
pub enum FetchError {
    /// Source file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file is not valid JSON
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The calendar list is empty
    #[error("No calendar available")]
    CalendarNotFound,

    /// A calendar id that cannot name a file inside the source directory
    #[error("Calendar id {0:?} is not a plain file name")]
    InvalidCalendarId(String),

    /// No source is configured or the source refused the request
    #[error("Calendar source unavailable: {0}")]
    Unavailable(String),
}

/// The resolver was handed a slice that breaks its ordering assumptions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// Event at `index` starts before its predecessor
    #[error("events are not ordered by start (index {index})")]
    Unsorted { index: usize },

    /// Event at `index` does not end after it starts
    #[error("event at index {index} has an empty or negative interval")]
    EmptyInterval { index: usize },

    /// No rule placed `now`; the events overlap in an unexpected way
    #[error("could not place {now} in the day's events")]
    Unresolved { now: Instant },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
