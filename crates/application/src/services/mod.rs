//! Application services - Use case implementations

mod booking_service;

pub use booking_service::{BookingOutcome, BookingService};
