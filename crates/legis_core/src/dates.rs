//! Day arithmetic on the ISO date strings carried by timeline nodes.
//!
//! Anything that does not parse is treated as absent: gaps collapse to
//! zero days and durations to one day.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parses `2024-03-15`, `2024-03-15T10:00:00` or a full RFC 3339 timestamp
/// into seconds since the epoch (UTC assumed when no offset is given).
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date_time) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(date_time.unix_timestamp());
    }
    let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(date_time) = PrimitiveDateTime::parse(value, local) {
        return Some(date_time.assume_utc().unix_timestamp());
    }
    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(value, date_only)
        .ok()
        .map(|date| date.midnight().assume_utc().unix_timestamp())
}

pub fn parse_date(value: &str) -> Option<Date> {
    parse_timestamp(value)
        .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
        .map(OffsetDateTime::date)
}

/// Whole days between two dates, rounded up, regardless of order.
/// Zero when either side is missing or malformed.
pub fn days_between(date_end: &str, date_start: &str) -> u32 {
    match (parse_timestamp(date_end), parse_timestamp(date_start)) {
        (Some(end), Some(start)) => ceil_days((start - end).abs()),
        _ => 0,
    }
}

/// Length of a node's date range in days, never less than one.
pub fn duration_days(date_start: &str, date_end: &str) -> u32 {
    match (parse_timestamp(date_start), parse_timestamp(date_end)) {
        (Some(start), Some(end)) if end > start => ceil_days(end - start).max(1),
        _ => 1,
    }
}

fn ceil_days(seconds: i64) -> u32 {
    (seconds as f64 / SECONDS_PER_DAY).ceil() as u32
}
