use chrono::NaiveDate;

use crate::error::FetchError;
use crate::event::RawEvent;

/// Every calendar source implements this trait.
///
/// The call is synchronous and may block. No retry happens inside the
/// core; a failed fetch leaves the day uncached so the next request
/// tries again.
pub trait DayFetcher {
    /// Raw event records for `date`, expanded to single occurrences.
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEvent>, FetchError>;
}

impl<T: DayFetcher + ?Sized> DayFetcher for Box<T> {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEvent>, FetchError> {
        (**self).fetch_day(date)
    }
}

impl<T: DayFetcher + ?Sized> DayFetcher for &T {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEvent>, FetchError> {
        (**self).fetch_day(date)
    }
}

/// Source used when nothing is configured. Every fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl DayFetcher for Unconfigured {
    fn fetch_day(&self, _date: NaiveDate) -> Result<Vec<RawEvent>, FetchError> {
        Err(FetchError::Unavailable(
            "no calendar source configured (set source.dir)".to_string(),
        ))
    }
}
