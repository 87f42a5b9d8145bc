//! Integration tests for the end-to-end day scenarios.
//!
//! Each test walks raw calendar records through normalization, ordering,
//! the day cache and the resolver, the way the schedule service does.

use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use scholaris_core::time::from_naive;
use scholaris_core::{
    normalize_all, order, resolve, DayCache, Event, Instant, RawEvent, SituationKind,
    TimestampMode,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn at(h: u32, m: u32) -> Instant {
    from_naive(today().and_hms_opt(h, m, 0).unwrap())
}

fn lesson(id: &str, title: &str, start: &str, end: &str) -> RawEvent {
    json!({
        "id": id,
        "summary": title,
        "location": "Room 101",
        "start": { "dateTime": format!("2026-10-17T{start}:00+02:00"), "timeZone": "Europe/Berlin" },
        "end": { "dateTime": format!("2026-10-17T{end}:00+02:00"), "timeZone": "Europe/Berlin" }
    })
}

fn title(event: &Option<Event>) -> Option<&str> {
    event.as_ref().map(Event::title)
}

#[test]
fn test_break_between_two_lessons() {
    let records = vec![
        lesson("g", "German", "09:00", "09:45"),
        lesson("m", "Math", "08:00", "08:45"),
    ];
    let schedule = order(normalize_all(&records, TimestampMode::StripOffset).events);

    let situation = resolve(&schedule, at(8, 50));
    assert_eq!(title(&situation.last), Some("Math"));
    assert_eq!(title(&situation.current), None);
    assert_eq!(title(&situation.next), Some("German"));
    assert_eq!(situation.kind(), SituationKind::Between);
    assert_eq!(situation.next_break_length(), Some(900));
}

#[test]
fn test_empty_day_is_freetime() {
    let schedule = order(Vec::new());
    for now in [at(0, 0), at(8, 50), at(23, 59)] {
        let situation = resolve(&schedule, now);
        assert!(situation.last.is_none());
        assert!(situation.current.is_none());
        assert!(situation.next.is_none());
        assert!(situation.is_freetime());
    }
}

#[test]
fn test_inside_single_lesson() {
    let records = vec![lesson("h", "History", "08:00", "08:45")];
    let schedule = order(normalize_all(&records, TimestampMode::StripOffset).events);

    let situation = resolve(&schedule, at(8, 20));
    assert_eq!(title(&situation.last), None);
    assert_eq!(title(&situation.current), Some("History"));
    assert_eq!(title(&situation.next), None);
    assert!(situation.has_relative_position());
    assert_eq!(situation.current_span_length(), 2700);
    assert_eq!(situation.seconds_remaining(at(8, 20)), 25 * 60);
}

#[test]
fn test_yesterdays_cache_is_stale() {
    let dir = TempDir::new().unwrap();
    let yesterday = today().pred_opt().unwrap();
    let x = Event::new("x", "X", at(8, 0) - 86_400, at(9, 0) - 86_400).unwrap();

    let mut cache = DayCache::new(dir.path());
    cache.write(yesterday, vec![x]).unwrap();

    let mut reopened = DayCache::new(dir.path());
    assert!(reopened.read(today()).is_none());
    assert_eq!(reopened.read(yesterday).map(|s| s.len()), Some(1));
}

#[test]
fn test_malformed_record_does_not_drop_the_day() {
    let records = vec![
        lesson("m", "Math", "08:00", "08:45"),
        json!({ "id": "allday", "summary": "Excursion", "start": { "date": "2026-10-17" }, "end": { "date": "2026-10-18" } }),
        json!({ "id": "bad", "summary": "Typo", "start": { "dateTime": "17.10.2026 10:00" }, "end": { "dateTime": "2026-10-17T11:00:00+02:00" } }),
        lesson("g", "German", "09:00", "09:45"),
    ];
    let normalized = normalize_all(&records, TimestampMode::StripOffset);
    assert_eq!(normalized.events.len(), 2);
    assert_eq!(normalized.dropped_count(), 2);

    let dropped_ids: Vec<_> = normalized
        .dropped
        .iter()
        .map(|(id, _)| id.as_deref())
        .collect();
    assert_eq!(dropped_ids, vec![Some("allday"), Some("bad")]);
}

#[test]
fn test_cache_roundtrip_equals_order() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        lesson("g", "German", "09:00", "09:45"),
        lesson("m", "Math", "08:00", "08:45"),
        lesson("p", "PE", "09:00", "10:30"),
    ];
    let events = normalize_all(&records, TimestampMode::StripOffset).events;

    let mut cache = DayCache::new(dir.path());
    cache.write(today(), events.clone()).unwrap();

    let mut reopened = DayCache::new(dir.path());
    assert_eq!(reopened.read(today()), Some(order(events)));
}

#[test]
fn test_overlapping_events_resolve_without_error() {
    let records = vec![
        lesson("a", "Double", "08:00", "09:30"),
        lesson("b", "Overlap", "09:00", "10:00"),
    ];
    let schedule = order(normalize_all(&records, TimestampMode::StripOffset).events);

    let situation = resolve(&schedule, at(9, 15));
    assert_eq!(title(&situation.current), Some("Double"));
    assert_eq!(title(&situation.next), Some("Overlap"));

    let later = resolve(&schedule, at(9, 45));
    assert_eq!(title(&later.last), Some("Double"));
    assert_eq!(title(&later.current), Some("Overlap"));
}

#[test]
fn test_long_event_ends_with_the_day_once_last_event_is_over() {
    let records = vec![
        lesson("s", "Study hall", "08:00", "13:00"),
        lesson("c", "Choir", "09:00", "10:00"),
    ];
    let schedule = order(normalize_all(&records, TimestampMode::StripOffset).events);

    let situation = resolve(&schedule, at(10, 30));
    assert_eq!(title(&situation.last), Some("Choir"));
    assert_eq!(title(&situation.current), None);
    assert_eq!(title(&situation.next), None);
    assert_eq!(situation.kind(), SituationKind::AfterLast);

    let during = resolve(&schedule, at(9, 30));
    assert_eq!(title(&during.current), Some("Study hall"));
    assert_eq!(title(&during.next), Some("Choir"));
}
