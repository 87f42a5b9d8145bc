//! # Scholaris Core Library
//!
//! Core logic for the Scholaris daily-schedule snapshot engine: turn a
//! day's calendar records into an ordered schedule, keep it in a
//! one-day cache, and answer "what was last, what is now, what comes
//! next" for any instant of that day.
//!
//! ## Architecture
//!
//! - **Events**: normalization of remote records into [`Event`]s on a
//!   local-naive time axis
//! - **Schedule**: the stable [`order`] that produces a [`DaySchedule`]
//! - **Situation**: the single-scan resolver behind [`resolve`]
//! - **Storage**: the single-day [`DayCache`] and TOML [`Config`]
//! - **Integrations**: the [`DayFetcher`] seam for calendar sources
//! - **Service**: [`ScheduleService`], cache-or-fetch-then-resolve
//!
//! A CLI binary (`scholaris`) sits on top of the same library.

pub mod error;
pub mod event;
pub mod integrations;
pub mod schedule;
pub mod service;
pub mod situation;
pub mod storage;
pub mod time;

pub use error::{CacheError, ConfigError, ConsistencyError, CoreError, EventError, FetchError};
pub use event::{normalize, normalize_all, Event, Normalized, RawEvent, TimestampMode};
pub use integrations::{DayFetcher, MirrorFetcher, Unconfigured};
pub use schedule::{order, DaySchedule};
pub use service::{Refresh, ScheduleService, ScheduleSource};
pub use situation::{resolve, try_resolve, Situation, SituationKind};
pub use storage::{CacheEntry, Config, DayCache};
pub use time::Instant;
