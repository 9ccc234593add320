//! Event date handling.
//!
//! Event dates arrive as free-form strings in one of two shapes:
//! ISO (`2025-12-01`, optionally followed by a time part) or Japanese
//! (`2025年12月1日`, optionally followed by a weekday marker).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Events created within this window are flagged as new.
pub const NEW_EVENT_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised event date {raw:?}, expected YYYY-MM-DD or YYYY年MM月DD日")]
pub struct DateParseError {
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised time {raw:?}, expected HH:MM")]
pub struct TimeParseError {
    pub raw: String,
}

pub fn parse_event_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    parse_iso(trimmed)
        .or_else(|| parse_japanese(trimmed))
        .ok_or_else(|| DateParseError {
            raw: raw.to_string(),
        })
}

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn parse_japanese(raw: &str) -> Option<NaiveDate> {
    let (year, rest) = raw.split_once('年')?;
    let (month, rest) = rest.split_once('月')?;
    let (day, _) = rest.split_once('日')?;

    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, TimeParseError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| TimeParseError {
        raw: raw.to_string(),
    })
}

/// True when `created_at` lies no more than three days before `now`.
pub fn is_new_event(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at) <= Duration::days(NEW_EVENT_WINDOW_DAYS)
}
