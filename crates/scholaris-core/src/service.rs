//! Schedule service: cache-or-fetch, then resolve.
//!
//! The service owns the [`DayCache`] and a [`DayFetcher`]. The first
//! request for a day reads the cache; a miss fetches, normalizes,
//! orders and writes the day back. Later requests on the same day are
//! served from memory.
//!
//! Nothing here fails the caller. A fetch failure yields an empty day
//! (and, through the resolver, the all-absent situation); a cache write
//! failure is logged and the fetched day is still used.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CacheError, Result};
use crate::event::{normalize_all, TimestampMode};
use crate::integrations::{DayFetcher, MirrorFetcher, Unconfigured};
use crate::schedule::{order, DaySchedule};
use crate::situation::{resolve, Situation};
use crate::storage::{Config, DayCache};
use crate::time::{self, Instant};

/// Where the schedule of a refresh came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// Valid cache record for the day.
    Cache,
    /// Fresh fetch from the calendar source.
    Fetched,
    /// Fetch failed and nothing was cached; the day is empty.
    Unavailable,
}

/// Outcome of loading one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Refresh {
    pub date: NaiveDate,
    pub source: ScheduleSource,
    /// Events in the resulting schedule.
    pub events: usize,
    /// Raw records dropped as malformed (fetches only).
    pub dropped: usize,
    /// Whether the fetched day reached the cache file.
    pub cache_written: bool,
}

pub struct ScheduleService<F> {
    cache: DayCache,
    fetcher: F,
    mode: TimestampMode,
    today: Option<(NaiveDate, DaySchedule)>,
    last_refresh: Option<Refresh>,
}

impl ScheduleService<Box<dyn DayFetcher>> {
    /// Service described by `config`: the mirror under `source.dir`, or
    /// [`Unconfigured`] (cache only) when no source is set.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`](crate::CoreError::Config) if the cache
    /// directory falls back to an unavailable data directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = DayCache::new(config.cache_dir()?);
        let fetcher: Box<dyn DayFetcher> = match &config.source.dir {
            Some(dir) => Box::new(MirrorFetcher::new(
                dir.clone(),
                config.source.calendar_hotwords.clone(),
            )),
            None => Box::new(Unconfigured),
        };
        Ok(Self::new(cache, fetcher).with_timestamp_mode(config.source.timestamp_mode))
    }
}

impl<F: DayFetcher> ScheduleService<F> {
    pub fn new(cache: DayCache, fetcher: F) -> Self {
        Self {
            cache,
            fetcher,
            mode: TimestampMode::default(),
            today: None,
            last_refresh: None,
        }
    }

    pub fn with_timestamp_mode(mut self, mode: TimestampMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache(&self) -> &DayCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Report of the most recent load, if any happened yet.
    pub fn last_refresh(&self) -> Option<&Refresh> {
        self.last_refresh.as_ref()
    }

    /// Situation at `now`, loading the day `now` falls on if needed.
    pub fn get_situation(&mut self, now: Instant) -> Situation {
        let today = time::day_of(now);
        let schedule = self.schedule_for(today);
        resolve(&schedule, now)
    }

    /// Ordered schedule of `today`.
    pub fn schedule_for(&mut self, today: NaiveDate) -> DaySchedule {
        if let Some((date, schedule)) = &self.today {
            if *date == today {
                return schedule.clone();
            }
        }
        self.load(today).1
    }

    /// Forget the in-memory day and load `today` again.
    ///
    /// A valid cache record is still preferred over the source; call
    /// [`invalidate_cache`](Self::invalidate_cache) first to force a fetch.
    pub fn refresh(&mut self, today: NaiveDate) -> Refresh {
        self.today = None;
        self.load(today).0
    }

    /// Delete the persisted day and drop the in-memory one.
    ///
    /// # Errors
    /// Returns [`CacheError::Remove`] if the cache file cannot be deleted.
    pub fn invalidate_cache(&mut self) -> Result<(), CacheError> {
        self.today = None;
        self.last_refresh = None;
        self.cache.invalidate()
    }

    fn load(&mut self, today: NaiveDate) -> (Refresh, DaySchedule) {
        let (report, schedule) = match self.cache.read(today) {
            Some(schedule) => (
                Refresh {
                    date: today,
                    source: ScheduleSource::Cache,
                    events: schedule.len(),
                    dropped: 0,
                    cache_written: false,
                },
                schedule,
            ),
            None => self.fetch(today),
        };

        // Failed fetches stay unmemoized so the next request retries.
        if report.source != ScheduleSource::Unavailable {
            self.today = Some((today, schedule.clone()));
        }
        self.last_refresh = Some(report.clone());
        (report, schedule)
    }

    fn fetch(&mut self, today: NaiveDate) -> (Refresh, DaySchedule) {
        let records = match self.fetcher.fetch_day(today) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(%today, error = %err, "fetch failed, using an empty day");
                let report = Refresh {
                    date: today,
                    source: ScheduleSource::Unavailable,
                    events: 0,
                    dropped: 0,
                    cache_written: false,
                };
                return (report, DaySchedule::default());
            }
        };

        let normalized = normalize_all(&records, self.mode);
        let dropped = normalized.dropped_count();
        let schedule = order(normalized.events);

        let cache_written = match self.cache.write(today, schedule.clone()) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%today, error = %err, "could not write day cache");
                false
            }
        };

        tracing::info!(%today, events = schedule.len(), dropped, "loaded day from source");
        let report = Refresh {
            date: today,
            source: ScheduleSource::Fetched,
            events: schedule.len(),
            dropped,
            cache_written,
        };
        (report, schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::event::RawEvent;
    use serde_json::json;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct StaticFetcher {
        records: Vec<RawEvent>,
        fail: bool,
        calls: Cell<usize>,
    }

    impl StaticFetcher {
        fn ok(records: Vec<RawEvent>) -> Self {
            Self {
                records,
                fail: false,
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                records: Vec::new(),
                fail: true,
                calls: Cell::new(0),
            }
        }
    }

    impl DayFetcher for StaticFetcher {
        fn fetch_day(&self, _date: NaiveDate) -> Result<Vec<RawEvent>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(FetchError::Unavailable("offline".to_string()))
            } else {
                Ok(self.records.clone())
            }
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn at(h: u32, m: u32) -> Instant {
        time::from_naive(day().and_hms_opt(h, m, 0).unwrap())
    }

    fn record(id: &str, start: &str, end: &str) -> RawEvent {
        json!({
            "id": id,
            "summary": id,
            "start": { "dateTime": format!("2026-10-17T{start}:00+02:00") },
            "end": { "dateTime": format!("2026-10-17T{end}:00+02:00") }
        })
    }

    fn lessons() -> Vec<RawEvent> {
        vec![
            record("german", "09:00", "09:45"),
            record("math", "08:00", "08:45"),
        ]
    }

    #[test]
    fn fetches_once_then_serves_from_memory() {
        let dir = TempDir::new().unwrap();
        let mut service = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::ok(lessons()));

        let s = service.get_situation(at(8, 50));
        assert_eq!(s.last.as_ref().map(|e| e.id()), Some("math"));
        assert_eq!(s.next.as_ref().map(|e| e.id()), Some("german"));
        assert_eq!(s.next_break_length(), Some(900));

        service.get_situation(at(9, 10));
        assert_eq!(service.fetcher().calls.get(), 1);

        let report = service.last_refresh().unwrap();
        assert_eq!(report.source, ScheduleSource::Fetched);
        assert_eq!(report.events, 2);
        assert!(report.cache_written);
    }

    #[test]
    fn second_service_reads_the_cache() {
        let dir = TempDir::new().unwrap();
        let mut first = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::ok(lessons()));
        first.schedule_for(day());

        let mut second = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::failing());
        let schedule = second.schedule_for(day());
        assert_eq!(schedule.len(), 2);
        assert_eq!(second.fetcher().calls.get(), 0);
        assert_eq!(second.last_refresh().unwrap().source, ScheduleSource::Cache);
    }

    #[test]
    fn fetch_failure_degrades_and_retries() {
        let dir = TempDir::new().unwrap();
        let mut service = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::failing());

        assert_eq!(service.get_situation(at(8, 50)), Situation::default());
        assert_eq!(
            service.last_refresh().unwrap().source,
            ScheduleSource::Unavailable
        );
        assert!(!service.cache().path().exists());

        service.get_situation(at(8, 51));
        assert_eq!(service.fetcher().calls.get(), 2);
    }

    #[test]
    fn malformed_records_are_counted() {
        let dir = TempDir::new().unwrap();
        let mut records = lessons();
        records.push(json!({ "id": "broken", "summary": "No times" }));
        let mut service = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::ok(records));

        let report = service.refresh(day());
        assert_eq!(report.events, 2);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn cache_write_failure_keeps_the_day() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut service = ScheduleService::new(DayCache::new(&blocker), StaticFetcher::ok(lessons()));

        let report = service.refresh(day());
        assert_eq!(report.source, ScheduleSource::Fetched);
        assert!(!report.cache_written);

        assert_eq!(service.schedule_for(day()).len(), 2);
        assert_eq!(service.fetcher().calls.get(), 1);
    }

    #[test]
    fn invalidate_forces_a_fetch() {
        let dir = TempDir::new().unwrap();
        let mut service = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::ok(lessons()));
        service.schedule_for(day());
        service.invalidate_cache().unwrap();
        assert!(!service.cache().path().exists());
        assert!(service.last_refresh().is_none());

        service.schedule_for(day());
        assert_eq!(service.fetcher().calls.get(), 2);
    }

    #[test]
    fn from_config_reads_the_configured_mirror() {
        let cache_dir = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        let events = json!({ "items": lessons() });
        std::fs::write(mirror.path().join("events.json"), events.to_string()).unwrap();

        let mut config = Config::default();
        config.cache.dir = Some(cache_dir.path().to_path_buf());
        config.source.dir = Some(mirror.path().to_path_buf());
        let mut service = ScheduleService::from_config(&config).unwrap();

        assert_eq!(service.schedule_for(day()).len(), 2);
        assert_eq!(service.cache().path(), cache_dir.path().join("event_cache.json"));
        assert!(service.last_refresh().unwrap().cache_written);
    }

    #[test]
    fn from_config_without_source_serves_cache_only() {
        let cache_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.cache.dir = Some(cache_dir.path().to_path_buf());
        let mut service = ScheduleService::from_config(&config).unwrap();

        assert!(service.schedule_for(day()).is_empty());
        assert_eq!(
            service.last_refresh().unwrap().source,
            ScheduleSource::Unavailable
        );
    }

    #[test]
    fn new_day_triggers_a_new_load() {
        let dir = TempDir::new().unwrap();
        let mut service = ScheduleService::new(DayCache::new(dir.path()), StaticFetcher::ok(lessons()));
        service.schedule_for(day());
        service.schedule_for(day().succ_opt().unwrap());
        assert_eq!(service.fetcher().calls.get(), 2);
    }
}
