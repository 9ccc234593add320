//! In-memory filter and sort pipeline over event lists.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::dates::{is_new_event, parse_event_date};
use crate::models::{Event, EventType};
use crate::regions::Region;

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub prefecture: Option<String>,
    pub region: Option<Region>,
    pub beginner_friendly: Option<bool>,
    /// Calendar month, 1..=12.
    pub month: Option<u32>,
    pub date: Option<NaiveDate>,
    /// Keep events dated before today. Off for public listings.
    pub include_past: bool,
}

impl EventFilter {
    fn matches_fields(&self, event: &Event) -> bool {
        if self.event_type.is_some_and(|t| t != event.event_type) {
            return false;
        }
        if self
            .prefecture
            .as_deref()
            .is_some_and(|p| p != event.prefecture)
        {
            return false;
        }
        if self.region.is_some_and(|r| !r.contains(&event.prefecture)) {
            return false;
        }
        if self
            .beginner_friendly
            .is_some_and(|b| b != event.beginner_friendly)
        {
            return false;
        }
        true
    }

    fn matches_date(&self, date: NaiveDate, today: NaiveDate) -> bool {
        if self.month.is_some_and(|m| m != date.month()) {
            return false;
        }
        if self.date.is_some_and(|d| d != date) {
            return false;
        }
        self.include_past || date >= today
    }
}

/// An event that passed the pipeline, with its parsed date.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEvent {
    pub event: Event,
    pub date: NaiveDate,
    pub is_new: bool,
}

/// A record left out of a listing because its date could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateIssue {
    pub event_id: Uuid,
    pub event_name: String,
    pub raw_date: String,
}

#[derive(Debug, Clone, Default)]
pub struct EventListing {
    pub events: Vec<ListedEvent>,
    pub date_issues: Vec<DateIssue>,
}

/// Filter, then order new events first and by ascending date.
pub fn apply<I>(events: I, filter: &EventFilter, today: NaiveDate, now: DateTime<Utc>) -> EventListing
where
    I: IntoIterator<Item = Event>,
{
    let mut listing = EventListing::default();

    for event in events {
        if event.is_deleted() || !filter.matches_fields(&event) {
            continue;
        }

        let date = match parse_event_date(&event.event_date) {
            Ok(date) => date,
            Err(err) => {
                warn!(event_id = %event.id, error = %err, "event left out of listing");
                listing.date_issues.push(DateIssue {
                    event_id: event.id,
                    event_name: event.name,
                    raw_date: event.event_date,
                });
                continue;
            }
        };

        if !filter.matches_date(date, today) {
            continue;
        }

        let is_new = is_new_event(event.created_at, now);
        listing.events.push(ListedEvent { event, date, is_new });
    }

    sort_listed(&mut listing.events);
    listing
}

pub fn sort_listed(events: &mut [ListedEvent]) {
    events.sort_by(|a, b| b.is_new.cmp(&a.is_new).then(a.date.cmp(&b.date)));
}
