//! Doorman provisions guest door codes for a short-term rental from
//! per-room iCal booking feeds.
//!
//! Each upcoming booking gets a 4-digit code derived from the guest's
//! phone number (found in the reservation description) pushed to the
//! shared front door lock and the room's own lock via the remote lock
//! API. Results are summarized on the console and exported to CSV.

pub mod booking;
pub mod cli;
pub mod core;
pub mod feed;
pub mod ical;
pub mod lock;
pub mod phone;
pub mod report;
pub mod workflow;
