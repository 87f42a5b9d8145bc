//! Ordered day schedule.
//!
//! A [`DaySchedule`] can only be built through [`order`] (or one of the
//! conversions that call it), so holding one means the events are
//! ascending by start with ties kept in input order.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Events of one calendar day, ascending by start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Event>", into = "Vec<Event>")]
pub struct DaySchedule {
    events: Vec<Event>,
}

/// Stable sort by start. Equal starts keep their relative input order.
pub fn order<I>(events: I) -> DaySchedule
where
    I: IntoIterator<Item = Event>,
{
    let mut events: Vec<Event> = events.into_iter().collect();
    events.sort_by_key(Event::start);
    DaySchedule { events }
}

impl DaySchedule {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Deref for DaySchedule {
    type Target = [Event];

    fn deref(&self) -> &[Event] {
        &self.events
    }
}

impl From<Vec<Event>> for DaySchedule {
    fn from(events: Vec<Event>) -> Self {
        order(events)
    }
}

impl From<DaySchedule> for Vec<Event> {
    fn from(schedule: DaySchedule) -> Self {
        schedule.events
    }
}

impl FromIterator<Event> for DaySchedule {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        order(iter)
    }
}

impl<'a> IntoIterator for &'a DaySchedule {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl IntoIterator for DaySchedule {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
