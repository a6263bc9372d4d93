//! Entities - booking aggregates with identity and lifecycle

mod booking;

pub use booking::{
    BookingAmendment, BookingRequest, Occupancy, Passenger, PaymentMethod, TimingIntent,
    TripEndpoint,
};
