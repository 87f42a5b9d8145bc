pub mod cache;
pub mod config;
pub mod schedule;
pub mod situation;
pub mod watch;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use scholaris_core::time::{self, Instant};
use scholaris_core::{Config, DayFetcher, ScheduleService};

pub type Service = ScheduleService<Box<dyn DayFetcher>>;

/// Build the schedule service described by `config`.
pub fn service(config: &Config) -> scholaris_core::error::Result<Service> {
    ScheduleService::from_config(config)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parse `--at`: a local date-time, or a time of day today.
pub fn parse_at(value: &str) -> Result<Instant, String> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(time::from_naive(dt));
        }
    }
    for format in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(value, format) {
            let today = time::day_of(time::now_local());
            return Ok(time::from_naive(today.and_time(t)));
        }
    }
    Err(format!(
        "invalid time '{value}' (expected YYYY-MM-DDTHH:MM[:SS] or HH:MM)"
    ))
}

/// Parse `--date` as `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{value}': {e}"))
}

/// `HH:MM` of an instant.
pub fn clock(instant: Instant) -> String {
    time::to_naive(instant).format("%H:%M").to_string()
}

/// `1h 05m`, `12m` or `40s`.
pub fn duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    let (h, m, s) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
    if h > 0 {
        format!("{sign}{h}h {m:02}m")
    } else if m > 0 {
        format!("{sign}{m}m")
    } else {
        format!("{sign}{s}s")
    }
}
