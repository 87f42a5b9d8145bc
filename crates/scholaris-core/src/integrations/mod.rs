//! Calendar sources.
//!
//! Remote authentication and transport live outside the core. A source
//! only has to hand over one day's raw event records through
//! [`DayFetcher`].

pub mod calendar_select;
pub mod mirror;
pub mod traits;

pub use calendar_select::{choose_calendar, CalendarListEntry, DEFAULT_HOTWORDS};
pub use mirror::MirrorFetcher;
pub use traits::{DayFetcher, Unconfigured};
