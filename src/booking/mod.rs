//! Turns parsed feed events into room-attributed bookings.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

use crate::ical;
use crate::phone;

/// Check-in opens at 15:00 on the arrival date, check-out is 11:00 on
/// the departure date.
const CHECK_IN: NaiveTime = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
const CHECK_OUT: NaiveTime = NaiveTime::from_hms_opt(11, 0, 0).unwrap();

/// One reservation with its derived door code and stay window.
///
/// `end_date` is exclusive in the iCal sense (the departure day).
/// Bookings are not deduplicated across feeds; a multi-room booking
/// shows up once per room.
#[derive(Clone, Debug)]
pub struct Booking {
    pub room: String,
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: NaiveDateTime,
    pub booking_id: String,
    /// `None` means no extractable phone code; the booking is recorded
    /// but never provisioned.
    pub phone_code: Option<String>,
    pub description: String,
    pub spans_weekend: bool,
}

/// Collect bookings from fetched feed texts, one `(room, raw_text)`
/// pair per room, in feed order.
///
/// Events missing a parseable start or end are skipped. Bookings that
/// ended more than one day before `now` are dropped; same-day, ongoing
/// and future stays are kept.
pub fn collect_bookings(feeds: &[(String, String)], now: NaiveDateTime) -> Vec<Booking> {
    let cutoff = now.date() - Duration::days(1);
    let mut bookings = Vec::new();

    for (room, text) in feeds {
        let mut room_count = 0;
        for event in ical::parse_events(text) {
            let Some(start) = ical::parse_datetime(&event.start_raw) else {
                continue;
            };
            let Some(end) = ical::parse_datetime(&event.end_raw) else {
                continue;
            };

            if end.date() < cutoff {
                continue;
            }

            let booking = build_booking(room, &event, start, end);
            tracing::info!(
                room = %booking.room,
                guest = %booking.guest_name,
                start = %booking.start_date,
                end = %booking.end_date,
                code = booking.phone_code.as_deref().unwrap_or("NONE"),
                "booking_collected"
            );
            bookings.push(booking);
            room_count += 1;
        }
        tracing::info!(room = %room, count = room_count, "room_bookings_collected");
    }

    bookings
}

fn build_booking(
    room: &str,
    event: &ical::CalendarEvent,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Booking {
    let guest_name = event
        .description
        .split_whitespace()
        .next()
        .unwrap_or("Guest")
        .to_string();

    let phone_code = phone::extract_code(&event.description).map(|p| p.code);

    Booking {
        room: room.to_string(),
        guest_name,
        start_date: start.date(),
        end_date: end.date(),
        check_in: start.date().and_time(CHECK_IN),
        check_out: end.date().and_time(CHECK_OUT),
        booking_id: extract_booking_id(&event.uid),
        phone_code,
        description: event.description.clone(),
        spans_weekend: spans_weekend(start.date(), end.date()),
    }
}

/// Feed UIDs look like `<vendor>-booking-<id>`; keep just the id when
/// that shape holds, otherwise use the UID as-is.
pub fn extract_booking_id(uid: &str) -> String {
    let re = Regex::new(r"booking-(.+)").unwrap();
    re.captures(uid)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| uid.to_string())
}

/// True iff any date in the inclusive range `[start, end]` falls on a
/// Saturday or Sunday.
pub fn spans_weekend(start: NaiveDate, end: NaiveDate) -> bool {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .any(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}
