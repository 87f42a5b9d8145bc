use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use scholaris_core::time;
use scholaris_core::{Config, DaySchedule, Refresh};

use super::clock;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Day to show (`YYYY-MM-DD`, default today)
    #[arg(long, value_parser = super::parse_date)]
    pub date: Option<NaiveDate>,
    /// Print JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ScheduleView<'a> {
    date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh: Option<&'a Refresh>,
    events: &'a DaySchedule,
}

pub fn run(args: ScheduleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut service = super::service(&config)?;
    let date = args
        .date
        .unwrap_or_else(|| time::day_of(time::now_local()));
    let schedule = service.schedule_for(date);

    if args.json {
        let view = ScheduleView {
            date,
            refresh: service.last_refresh(),
            events: &schedule,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if schedule.is_empty() {
        println!("no events on {date}");
    }
    for event in &schedule {
        let location = if event.location().is_empty() {
            String::new()
        } else {
            format!("  [{}]", event.location())
        };
        println!(
            "{}-{}  {}{location}",
            clock(event.start()),
            clock(event.end()),
            event.title()
        );
    }
    if let Some(report) = service.last_refresh() {
        if report.dropped > 0 {
            eprintln!("{} malformed record(s) skipped", report.dropped);
        }
    }
    Ok(())
}
