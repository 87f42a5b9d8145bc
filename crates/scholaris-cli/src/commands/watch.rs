use std::time::Duration;

use chrono::NaiveDate;
use clap::Args;

use scholaris_core::time::{self, Instant};
use scholaris_core::{Config, Refresh, ScheduleSource, Situation};

use super::situation::render;

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between ticks
    #[arg(long, default_value_t = 1)]
    pub interval: u64,
}

/// Whether a tick has to ask the service again: the shown situation ran
/// out, the day changed, or the day could not be loaded and a retry may
/// now succeed.
fn should_resolve(
    situation: &Situation,
    now: Instant,
    shown_day: NaiveDate,
    last_refresh: Option<&Refresh>,
) -> bool {
    let unavailable = last_refresh.is_some_and(|r| r.source == ScheduleSource::Unavailable);
    unavailable || situation.needs_refresh(now) || time::day_of(now) != shown_day
}

/// Tick loop. Prints the situation whenever a re-resolve changes it.
pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut service = super::service(&config)?;
    let interval = Duration::from_secs(args.interval.max(1));

    let mut now = time::now_local();
    let mut day = time::day_of(now);
    let mut situation = service.get_situation(now);
    print!("{}", render(&situation, now));

    loop {
        std::thread::sleep(interval);
        now = time::now_local();
        if !should_resolve(&situation, now, day, service.last_refresh()) {
            continue;
        }

        day = time::day_of(now);
        let next = service.get_situation(now);
        tracing::debug!(kind = ?next.kind(), "re-resolved situation");
        if next != situation {
            situation = next;
            println!();
            print!("{}", render(&situation, now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholaris_core::{resolve, Event};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn at(h: u32, m: u32) -> Instant {
        time::from_naive(day().and_hms_opt(h, m, 0).unwrap())
    }

    fn report(source: ScheduleSource) -> Refresh {
        Refresh {
            date: day(),
            source,
            events: 0,
            dropped: 0,
            cache_written: false,
        }
    }

    #[test]
    fn idle_tick_within_an_event() {
        let events = vec![Event::new("m", "Math", at(8, 0), at(8, 45)).unwrap()];
        let situation = resolve(&events, at(8, 10));
        let fetched = report(ScheduleSource::Fetched);
        assert!(!should_resolve(&situation, at(8, 20), day(), Some(&fetched)));
        assert!(should_resolve(&situation, at(8, 45), day(), Some(&fetched)));
    }

    #[test]
    fn failed_load_is_retried_on_the_next_tick() {
        let empty = Situation::default();
        assert!(!should_resolve(&empty, at(8, 0), day(), Some(&report(ScheduleSource::Cache))));
        assert!(should_resolve(
            &empty,
            at(8, 0),
            day(),
            Some(&report(ScheduleSource::Unavailable))
        ));
    }

    #[test]
    fn day_change_forces_a_resolve() {
        let empty = Situation::default();
        let yesterday = day().pred_opt().unwrap();
        assert!(should_resolve(&empty, at(0, 1), yesterday, None));
    }
}
