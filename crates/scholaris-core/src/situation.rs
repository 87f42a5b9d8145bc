//! Point-in-time situation: which event is last, current and next.
//!
//! [`resolve`] settles the day's edges first, then walks consecutive
//! pairs of the ordered events:
//!
//! ```text
//!  now <  first.start          -> (-,        -,     first)
//!  now >= last.end             -> (last,     -,     -)
//!  now in first                -> (-,        first, second)
//!  now in last                 -> (prev,     last,  -)
//!  prev.end <= now < e.start   -> (prev(e),  -,     e)
//!  now in [e.start, e.end)     -> (prev(e),  e,     next(e))
//! ```
//!
//! The edge checks win over the scan, so with overlapping events a
//! long event that outlasts a later, shorter one is no longer current
//! once the last event of the day has ended.
//!
//! Intervals are half-open, so an event is current from its first second
//! up to but not including its end.

use serde::{Deserialize, Serialize};

use crate::error::ConsistencyError;
use crate::event::Event;
use crate::time::{self, Instant};

/// The resolved last/current/next triple for one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    pub last: Option<Event>,
    pub current: Option<Event>,
    pub next: Option<Event>,
}

/// Coarse shape of a [`Situation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationKind {
    /// No events today.
    NoEvents,
    /// Before the first event of the day.
    BeforeFirst,
    /// Inside an event.
    InEvent,
    /// In a break between two events.
    Between,
    /// After the last event of the day.
    AfterLast,
}

impl Situation {
    pub fn new(last: Option<Event>, current: Option<Event>, next: Option<Event>) -> Self {
        Self {
            last,
            current,
            next,
        }
    }

    pub fn kind(&self) -> SituationKind {
        match (&self.last, &self.current, &self.next) {
            (_, Some(_), _) => SituationKind::InEvent,
            (Some(_), None, Some(_)) => SituationKind::Between,
            (None, None, Some(_)) => SituationKind::BeforeFirst,
            (Some(_), None, None) => SituationKind::AfterLast,
            (None, None, None) => SituationKind::NoEvents,
        }
    }

    /// Nothing running and nothing left today.
    pub fn is_freetime(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }

    /// Whether a progress position can be shown: inside an event, or in
    /// a break bounded on both sides.
    pub fn has_relative_position(&self) -> bool {
        self.current.is_some() || (self.last.is_some() && self.next.is_some())
    }

    /// Length of the span `now` sits in: the current event, or the break
    /// between `last` and `next`. Zero otherwise.
    pub fn current_span_length(&self) -> i64 {
        match (&self.last, &self.current, &self.next) {
            (_, Some(current), _) => current.duration(),
            (Some(last), None, Some(next)) => next.start() - last.end(),
            _ => 0,
        }
    }

    pub fn has_last_break(&self) -> bool {
        self.last.is_some() && self.current.is_some()
    }

    pub fn has_next_break(&self) -> bool {
        self.current.is_some() && self.next.is_some()
    }

    /// Break between `last` and `current`.
    pub fn last_break_length(&self) -> Option<i64> {
        match (&self.last, &self.current) {
            (Some(last), Some(current)) => Some(current.start() - last.end()),
            _ => None,
        }
    }

    /// Break before `next`: after `current` when inside an event, or the
    /// break in progress when between `last` and `next`.
    pub fn next_break_length(&self) -> Option<i64> {
        match (&self.last, &self.current, &self.next) {
            (_, Some(current), Some(next)) => Some(next.start() - current.end()),
            (Some(last), None, Some(next)) => Some(next.start() - last.end()),
            _ => None,
        }
    }

    /// Seconds until this situation stops being accurate: the end of the
    /// current event, the start of the next one, or the end of the day.
    pub fn seconds_remaining(&self, now: Instant) -> i64 {
        if let Some(current) = &self.current {
            current.end() - now
        } else if let Some(next) = &self.next {
            next.start() - now
        } else {
            time::start_of_next_day(now) - now
        }
    }

    /// The tick should re-resolve once the boundary has been reached.
    ///
    /// A freetime situation counts down to midnight of whatever day `now`
    /// is on, so callers also re-resolve when the day changes.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        self.seconds_remaining(now) <= 0
    }

    /// Fraction of the current span already elapsed, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> Option<f64> {
        if !self.has_relative_position() {
            return None;
        }
        let span = self.current_span_length();
        if span <= 0 {
            return None;
        }
        let elapsed = span - self.seconds_remaining(now);
        Some((elapsed as f64 / span as f64).clamp(0.0, 1.0))
    }
}

fn check_order(events: &[Event]) -> Result<(), ConsistencyError> {
    for (index, event) in events.iter().enumerate() {
        if event.end() <= event.start() {
            return Err(ConsistencyError::EmptyInterval { index });
        }
        if index > 0 && event.start() < events[index - 1].start() {
            return Err(ConsistencyError::Unsorted { index });
        }
    }
    Ok(())
}

/// Resolve the situation at `now`, rejecting input that is not ordered.
///
/// # Errors
/// Returns a [`ConsistencyError`] if `events` is not ascending by start,
/// holds an event that does not end after it starts, or leaves `now`
/// unplaced.
pub fn try_resolve(events: &[Event], now: Instant) -> Result<Situation, ConsistencyError> {
    check_order(events)?;

    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Ok(Situation::default());
    };
    if now < first.start() {
        return Ok(Situation::new(None, None, Some(first.clone())));
    }
    if now >= last.end() {
        return Ok(Situation::new(Some(last.clone()), None, None));
    }
    if events.len() == 1 {
        return Ok(Situation::new(None, Some(first.clone()), None));
    }
    if first.contains(now) {
        return Ok(Situation::new(None, Some(first.clone()), events.get(1).cloned()));
    }
    if last.contains(now) {
        let previous = events.get(events.len() - 2).cloned();
        return Ok(Situation::new(previous, Some(last.clone()), None));
    }

    for (index, pair) in events.windows(2).enumerate() {
        let (previous, event) = (&pair[0], &pair[1]);
        if now < event.start() {
            return Ok(Situation::new(Some(previous.clone()), None, Some(event.clone())));
        }
        if event.contains(now) {
            let next = events.get(index + 2).cloned();
            return Ok(Situation::new(
                Some(previous.clone()),
                Some(event.clone()),
                next,
            ));
        }
    }

    Err(ConsistencyError::Unresolved { now })
}

/// Resolve the situation at `now`.
///
/// Never fails: input that breaks the ordering assumptions is reported
/// as a diagnostic and yields the all-absent situation.
pub fn resolve(events: &[Event], now: Instant) -> Situation {
    try_resolve(events, now).unwrap_or_else(|err| {
        tracing::warn!(error = %err, events = events.len(), now, "could not resolve situation");
        Situation::default()
    })
}
