//! Drives dual-lock provisioning for each booking.
//!
//! Every booking with a derived code gets two sequential calls: the
//! shared front door first, then the room's own lock. The two
//! outcomes are recorded independently so a partial failure (one lock
//! programmed, the other not) is visible in the report instead of
//! collapsing into a single flag.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::booking::Booking;
use crate::core::AppConfig;
use crate::lock::{CodeRequest, LockClient, ProvisionOutcome};

/// Label used for the shared front door in code display names.
pub const FRONT_DOOR_LABEL: &str = "Front Door";

/// Per-booking provisioning result. Created once, never mutated.
#[derive(Clone, Debug)]
pub struct CodeRecord {
    pub booking_id: String,
    pub guest_name: String,
    pub room: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub phone_code: Option<String>,
    pub front_door_success: bool,
    pub room_code_success: bool,
    /// Both locks carry the code.
    pub codes_match: bool,
    pub is_weekend: bool,
    pub failure_reason: Option<String>,
}

/// Courtesy delays between remote calls. The lock service rate-limits
/// aggressively; these are tunable and not a correctness requirement.
#[derive(Clone, Debug)]
pub struct Pacing {
    pub between_locks: Duration,
    pub between_bookings: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_locks: Duration::from_secs(1),
            between_bookings: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    /// No delays, for tests.
    pub fn none() -> Self {
        Self {
            between_locks: Duration::ZERO,
            between_bookings: Duration::ZERO,
        }
    }
}

/// Process every booking: derive the validity window, provision the
/// front door and room locks in that order, and record the combined
/// outcome. Bookings already ended (relative to `now`) are skipped
/// even if the aggregator let them through.
pub async fn process_bookings(
    client: &dyn LockClient,
    config: &AppConfig,
    bookings: &[Booking],
    now: NaiveDateTime,
    pacing: &Pacing,
) -> Vec<CodeRecord> {
    let mut records = Vec::new();

    for booking in bookings {
        if booking.end_date < now.date() {
            continue;
        }

        tracing::info!(
            guest = %booking.guest_name,
            room = %booking.room,
            start = %booking.start_date,
            end = %booking.end_date,
            "processing_booking"
        );

        let Some(code) = booking.phone_code.clone() else {
            tracing::warn!(
                booking_id = %booking.booking_id,
                room = %booking.room,
                "skipping_booking_without_phone_code"
            );
            records.push(CodeRecord {
                booking_id: booking.booking_id.clone(),
                guest_name: booking.guest_name.clone(),
                room: booking.room.clone(),
                start_date: booking.start_date,
                end_date: booking.end_date,
                phone_code: None,
                front_door_success: false,
                room_code_success: false,
                codes_match: false,
                is_weekend: booking.spans_weekend,
                failure_reason: Some(
                    "No phone number found in booking description".to_string(),
                ),
            });
            continue;
        };

        let front_request = CodeRequest {
            lock_id: config.front_door_lock_id,
            code: code.clone(),
            guest_name: booking.guest_name.clone(),
            label: FRONT_DOOR_LABEL.to_string(),
            booking_id: booking.booking_id.clone(),
            valid_from: booking.check_in,
            valid_to: booking.check_out,
        };
        let front_outcome = client.create_code(&front_request).await;

        tokio::time::sleep(pacing.between_locks).await;

        let room_outcome = match config.room_lock_id(&booking.room) {
            Some(lock_id) => {
                let room_request = CodeRequest {
                    lock_id,
                    code: code.clone(),
                    guest_name: booking.guest_name.clone(),
                    label: booking.room.clone(),
                    booking_id: booking.booking_id.clone(),
                    valid_from: booking.check_in,
                    valid_to: booking.check_out,
                };
                client.create_code(&room_request).await
            }
            None => {
                tracing::error!(room = %booking.room, "no_lock_configured_for_room");
                ProvisionOutcome::Failed(format!("No lock configured for {}", booking.room))
            }
        };

        let front_ok = front_outcome.is_success();
        let room_ok = room_outcome.is_success();
        let failure_reason = failure_reason(&code, front_ok, room_ok);

        if let Some(reason) = &failure_reason {
            tracing::warn!(booking_id = %booking.booking_id, reason = %reason, "provisioning_incomplete");
        } else {
            tracing::info!(booking_id = %booking.booking_id, code = %code, "both_locks_provisioned");
        }

        records.push(CodeRecord {
            booking_id: booking.booking_id.clone(),
            guest_name: booking.guest_name.clone(),
            room: booking.room.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            phone_code: Some(code),
            front_door_success: front_ok,
            room_code_success: room_ok,
            codes_match: front_ok && room_ok,
            is_weekend: booking.spans_weekend,
            failure_reason,
        });

        tokio::time::sleep(pacing.between_bookings).await;
    }

    records
}

fn failure_reason(code: &str, front_ok: bool, room_ok: bool) -> Option<String> {
    match (front_ok, room_ok) {
        (true, true) => None,
        (false, false) => Some(format!("Phone code {} failed on both locks", code)),
        (false, true) => Some(format!("Phone code {} failed on front door", code)),
        (true, false) => Some(format!("Phone code {} failed on room lock", code)),
    }
}
