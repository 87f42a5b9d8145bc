//! Picking the timetable calendar out of a user's calendar list.

use serde::{Deserialize, Serialize};

/// Words that mark a calendar as holding a school or university timetable.
pub const DEFAULT_HOTWORDS: &[&str] = &[
    "college",
    "university",
    "school",
    "schule",
    "studium",
    "école",
    "ecole",
    "collège",
    "études",
    "etudes",
];

/// One entry of a calendar-list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

/// First calendar whose lowercased summary contains a hotword, else the
/// first calendar. `None` only for an empty list.
pub fn choose_calendar<'a, S: AsRef<str>>(
    calendars: &'a [CalendarListEntry],
    hotwords: &[S],
) -> Option<&'a CalendarListEntry> {
    let chosen = calendars
        .iter()
        .find(|calendar| {
            let summary = calendar.summary.to_lowercase();
            hotwords
                .iter()
                .any(|word| summary.contains(&word.as_ref().to_lowercase()))
        })
        .or_else(|| calendars.first());

    if let Some(calendar) = chosen {
        tracing::info!(id = %calendar.id, summary = %calendar.summary, "chose calendar");
    }
    chosen
}
