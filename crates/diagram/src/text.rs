//! Polish label text: day counts and short date ranges.

use legis_core::dates::parse_date;
use time::Month;

pub fn format_days(days: u32) -> String {
    if days == 1 {
        "1 dzień".to_string()
    } else {
        format!("{days} dni")
    }
}

fn short_month(month: Month) -> &'static str {
    match month {
        Month::January => "sty",
        Month::February => "lut",
        Month::March => "mar",
        Month::April => "kwi",
        Month::May => "maj",
        Month::June => "cze",
        Month::July => "lip",
        Month::August => "sie",
        Month::September => "wrz",
        Month::October => "paź",
        Month::November => "lis",
        Month::December => "gru",
    }
}

/// `15 mar`; empty for dates that do not parse.
pub fn format_date(value: &str) -> String {
    parse_date(value)
        .map(|date| format!("{} {}", date.day(), short_month(date.month())))
        .unwrap_or_default()
}

/// A single date when both ends fall on the same day, else `start → end`.
pub fn format_date_range(start: &str, end: &str) -> String {
    let (start, end) = (format_date(start), format_date(end));
    if start == end || end.is_empty() {
        start
    } else if start.is_empty() {
        end
    } else {
        format!("{start} → {end}")
    }
}

/// Rough advance width of `text` in a sans-serif face at `font_size` pixels.
pub fn approx_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.6
}
