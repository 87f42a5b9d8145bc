//! Local-naive instants.
//!
//! All arithmetic in the core runs on seconds since the epoch of the
//! *local wall clock*: a wall time of `08:00` on a given day maps to the
//! same number regardless of the machine's zone. Day boundaries are
//! therefore plain multiples of [`SECONDS_PER_DAY`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Seconds since the epoch, interpreted as local wall-clock time.
pub type Instant = i64;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Current local wall-clock time.
pub fn now_local() -> Instant {
    from_naive(Local::now().naive_local())
}

pub fn from_naive(dt: NaiveDateTime) -> Instant {
    dt.and_utc().timestamp()
}

/// Inverse of [`from_naive`], clamped to chrono's representable range.
pub fn to_naive(instant: Instant) -> NaiveDateTime {
    let dt = DateTime::<Utc>::from_timestamp(instant, 0).unwrap_or(if instant < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });
    dt.naive_utc()
}

/// Calendar day an instant falls on.
pub fn day_of(instant: Instant) -> NaiveDate {
    to_naive(instant).date()
}

/// Midnight that ends the day containing `instant`.
pub fn start_of_next_day(instant: Instant) -> Instant {
    (instant.div_euclid(SECONDS_PER_DAY) + 1) * SECONDS_PER_DAY
}
