//! Minimal iCal parsing for reservation feeds.
//!
//! This is deliberately not a full RFC 5545 implementation. Booking
//! feeds only ever carry flat `VEVENT` blocks with a handful of
//! properties, so a pair of regexes over the unfolded text is enough
//! and keeps odd vendor output from becoming a hard failure.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// One `VEVENT` block from a feed. Missing properties are empty
/// strings rather than errors; events lacking usable dates are
/// filtered out downstream.
#[derive(Clone, Debug, Default)]
pub struct CalendarEvent {
    pub description: String,
    pub start_raw: String,
    pub end_raw: String,
    pub uid: String,
    pub summary: String,
}

/// Join RFC 5545 folded lines: a line starting with a space or tab is
/// a continuation of the previous line. Must run before property
/// extraction or folded values get truncated mid-line.
pub fn unfold_lines(text: &str) -> String {
    let re = Regex::new(r"\r?\n[ \t]").unwrap();
    re.replace_all(text, "").into_owned()
}

/// Extract all `VEVENT` blocks and their properties from raw feed text.
pub fn parse_events(text: &str) -> Vec<CalendarEvent> {
    let unfolded = unfold_lines(text);
    let block_re = Regex::new(r"(?s)BEGIN:VEVENT(.*?)END:VEVENT").unwrap();

    // Property lines may carry a parameter suffix before the value,
    // e.g. `DTSTART;VALUE=DATE:20250103` is equivalent to `DTSTART:`.
    let description_re = property_regex("DESCRIPTION");
    let start_re = property_regex("DTSTART");
    let end_re = property_regex("DTEND");
    let uid_re = property_regex("UID");
    let summary_re = property_regex("SUMMARY");

    block_re
        .captures_iter(&unfolded)
        .map(|block| {
            let block = block.get(1).map_or("", |m| m.as_str());
            CalendarEvent {
                description: property_value(&description_re, block),
                start_raw: property_value(&start_re, block),
                end_raw: property_value(&end_re, block),
                uid: property_value(&uid_re, block),
                summary: property_value(&summary_re, block),
            }
        })
        .collect()
}

fn property_regex(field: &str) -> Regex {
    Regex::new(&format!(r"{}(?:;[^:]*)?:(.+)", field)).unwrap()
}

fn property_value(re: &Regex, block: &str) -> String {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parse an iCal date value. Two formats appear in booking feeds:
/// `YYYYMMDD` for all-day events and `YYYYMMDDTHHMMSS` for timed ones.
/// Anything else is `None` and the owning event is skipped.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if raw.contains('T') {
        NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S").ok()
    } else {
        NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }
}
