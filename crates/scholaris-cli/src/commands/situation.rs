use clap::Args;
use serde::Serialize;

use scholaris_core::time::{self, Instant};
use scholaris_core::{Config, Event, Situation, SituationKind};

use super::{clock, duration};

#[derive(Args)]
pub struct SituationArgs {
    /// Resolve at this local time (`YYYY-MM-DDTHH:MM[:SS]` or `HH:MM`) instead of now
    #[arg(long, value_parser = super::parse_at)]
    pub at: Option<Instant>,
    /// Print JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON form of a situation and its derived queries.
#[derive(Serialize)]
pub struct SituationView<'a> {
    pub now: Instant,
    pub kind: SituationKind,
    pub last: Option<&'a Event>,
    pub current: Option<&'a Event>,
    pub next: Option<&'a Event>,
    pub freetime: bool,
    pub has_relative_position: bool,
    pub current_span_length: i64,
    pub last_break_length: Option<i64>,
    pub next_break_length: Option<i64>,
    pub seconds_remaining: i64,
    pub progress: Option<f64>,
}

impl<'a> SituationView<'a> {
    pub fn new(situation: &'a Situation, now: Instant) -> Self {
        Self {
            now,
            kind: situation.kind(),
            last: situation.last.as_ref(),
            current: situation.current.as_ref(),
            next: situation.next.as_ref(),
            freetime: situation.is_freetime(),
            has_relative_position: situation.has_relative_position(),
            current_span_length: situation.current_span_length(),
            last_break_length: situation.last_break_length(),
            next_break_length: situation.next_break_length(),
            seconds_remaining: situation.seconds_remaining(now),
            progress: situation.progress(now),
        }
    }
}

fn slot(event: Option<&Event>) -> String {
    match event {
        Some(e) if e.location().is_empty() => {
            format!("{}-{}  {}", clock(e.start()), clock(e.end()), e.title())
        }
        Some(e) => format!(
            "{}-{}  {} ({})",
            clock(e.start()),
            clock(e.end()),
            e.title(),
            e.location()
        ),
        None => "-".to_string(),
    }
}

/// Human-readable rendering.
pub fn render(situation: &Situation, now: Instant) -> String {
    let mut out = format!("now      {}\n", time::to_naive(now).format("%Y-%m-%d %H:%M"));
    if situation.kind() == SituationKind::NoEvents {
        out.push_str("no events today\n");
        return out;
    }

    out.push_str(&format!("last     {}\n", slot(situation.last.as_ref())));
    out.push_str(&format!("current  {}\n", slot(situation.current.as_ref())));
    out.push_str(&format!("next     {}\n", slot(situation.next.as_ref())));

    let remaining = duration(situation.seconds_remaining(now));
    let status = match situation.kind() {
        SituationKind::InEvent => format!("ends in {remaining}"),
        SituationKind::Between | SituationKind::BeforeFirst => format!("next starts in {remaining}"),
        SituationKind::AfterLast | SituationKind::NoEvents => "done for today".to_string(),
    };
    match situation.progress(now) {
        Some(p) => out.push_str(&format!("status   {status} ({:.0}%)\n", p * 100.0)),
        None => out.push_str(&format!("status   {status}\n")),
    }
    if let Some(length) = situation.next_break_length() {
        out.push_str(&format!("break    {}\n", duration(length)));
    }
    out
}

pub fn run(args: SituationArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut service = super::service(&config)?;
    let now = args.at.unwrap_or_else(time::now_local);
    let situation = service.get_situation(now);

    if args.json {
        let view = SituationView::new(&situation, now);
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render(&situation, now));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholaris_core::resolve;

    fn lessons() -> Vec<Event> {
        vec![
            Event::new("m", "Math", 8 * 3600, 8 * 3600 + 2700)
                .unwrap()
                .with_location("Room 101"),
            Event::new("g", "German", 9 * 3600, 9 * 3600 + 2700).unwrap(),
        ]
    }

    #[test]
    fn renders_a_break() {
        let now = 8 * 3600 + 50 * 60;
        let situation = resolve(&lessons(), now);
        let text = render(&situation, now);
        assert!(text.contains("last     08:00-08:45  Math (Room 101)"));
        assert!(text.contains("current  -"));
        assert!(text.contains("next     09:00-09:45  German"));
        assert!(text.contains("next starts in 10m"));
        assert!(text.contains("break    15m"));
    }

    #[test]
    fn renders_an_empty_day() {
        let text = render(&Situation::default(), 0);
        assert!(text.contains("no events today"));
    }

    #[test]
    fn view_carries_derived_values() {
        let now = 8 * 3600 + 20 * 60;
        let situation = resolve(&lessons(), now);
        let json = serde_json::to_value(SituationView::new(&situation, now)).unwrap();
        assert_eq!(json["kind"], "in_event");
        assert_eq!(json["current"]["title"], "Math");
        assert_eq!(json["current_span_length"], 2700);
        assert_eq!(json["seconds_remaining"], 1500);
        assert_eq!(json["next_break_length"], 900);
    }
}
