//! Booking request entity - the normalized input to the dispatch engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{EmailAddress, GeoLocation, OrderRef, PhoneNumber};

/// When the trip should start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingIntent {
    /// Dispatch as soon as a vehicle is free
    Asap,
    /// Dispatch for a target instant
    Scheduled { at: DateTime<Utc> },
}

impl TimingIntent {
    /// The scheduled instant, when one exists
    #[must_use]
    pub const fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Asap => None,
            Self::Scheduled { at } => Some(*at),
        }
    }
}

impl std::fmt::Display for TimingIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asap => write!(f, "ASAP"),
            Self::Scheduled { at } => write!(f, "{}", at.format("%Y-%m-%d %H:%M UTC")),
        }
    }
}

/// How the passenger intends to pay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the driver directly
    #[default]
    Cash,
    /// Card terminal in the vehicle
    Card,
    /// Charged to a corporate account
    Account,
}

/// One point along the trip: pickup, intermediate stop, or dropoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEndpoint {
    /// Display address (house, street, parish)
    pub address: String,
    /// Geocoded position; absent when the address never resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

impl TripEndpoint {
    /// Create an endpoint from an address alone
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            location: None,
        }
    }

    /// Attach a geocoded position
    #[must_use]
    pub const fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// The position, or the given regional fallback when geocoding failed
    #[must_use]
    pub fn location_or(&self, fallback: GeoLocation) -> GeoLocation {
        self.location.unwrap_or(fallback)
    }

    /// Whether this point can appear as an intermediate stop
    ///
    /// Stops need both an address and coordinates; ones that have neither
    /// are dropped from the route rather than failing the booking.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        !self.address.trim().is_empty() && self.location.is_some()
    }
}

/// Passenger identity and contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    /// Full name as shown to the driver
    pub name: String,
    /// Normalized contact number
    pub phone: PhoneNumber,
    /// Optional email for confirmations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
}

impl Passenger {
    /// Create a passenger with the mandatory fields
    #[must_use]
    pub fn new(name: impl Into<String>, phone: PhoneNumber) -> Self {
        Self {
            name: name.into(),
            phone,
            email: None,
        }
    }

    /// Attach an email address
    #[must_use]
    pub fn with_email(mut self, email: EmailAddress) -> Self {
        self.email = Some(email);
        self
    }
}

/// Seats, luggage, and access requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Passenger seats required
    pub seats: u8,
    /// Luggage pieces
    pub luggage: u8,
    /// Wheelchair-accessible vehicle required
    pub wheelchair: bool,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            seats: 1,
            luggage: 0,
            wheelchair: false,
        }
    }
}

/// A normalized booking request, ready for dispatch
///
/// This is the input collaborators hand to the engine: the booking UI has
/// already geocoded what it could and validated passenger contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Who is travelling
    pub passenger: Passenger,
    /// Trip origin
    pub pickup: TripEndpoint,
    /// Intermediate stops in visit order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stops: Vec<TripEndpoint>,
    /// Trip destination
    pub dropoff: TripEndpoint,
    /// Seats/luggage/access requirements
    #[serde(default)]
    pub occupancy: Occupancy,
    /// ASAP or scheduled departure
    pub timing: TimingIntent,
    /// How the passenger intends to pay
    #[serde(default)]
    pub payment: PaymentMethod,
    /// Free-text notes for the driver
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// When set, a reversed return trip is booked after the outbound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_at: Option<DateTime<Utc>>,
}

impl BookingRequest {
    /// Create a request with the mandatory fields
    #[must_use]
    pub fn new(passenger: Passenger, pickup: TripEndpoint, dropoff: TripEndpoint) -> Self {
        Self {
            passenger,
            pickup,
            stops: Vec::new(),
            dropoff,
            occupancy: Occupancy::default(),
            timing: TimingIntent::Asap,
            payment: PaymentMethod::default(),
            notes: String::new(),
            return_at: None,
        }
    }

    /// Set intermediate stops
    #[must_use]
    pub fn with_stops(mut self, stops: Vec<TripEndpoint>) -> Self {
        self.stops = stops;
        self
    }

    /// Set the departure timing
    #[must_use]
    pub const fn with_timing(mut self, timing: TimingIntent) -> Self {
        self.timing = timing;
        self
    }

    /// Set occupancy requirements
    #[must_use]
    pub const fn with_occupancy(mut self, occupancy: Occupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Set the payment method
    #[must_use]
    pub const fn with_payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = payment;
        self
    }

    /// Set driver notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Request a linked return trip at the given instant
    #[must_use]
    pub const fn with_return_at(mut self, return_at: DateTime<Utc>) -> Self {
        self.return_at = Some(return_at);
        self
    }

    /// Check the invariants the engine relies on
    ///
    /// Coordinates are deliberately not required here: endpoints that never
    /// geocoded are resolved to the regional fallback at submission time.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.passenger.name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "passenger name is required".to_string(),
            ));
        }
        if self.pickup.address.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "pickup address is required".to_string(),
            ));
        }
        if self.dropoff.address.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "dropoff address is required".to_string(),
            ));
        }
        if self.occupancy.seats == 0 {
            return Err(DomainError::ValidationError(
                "at least one seat is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A change request against an already-dispatched booking
///
/// Carries the full desired state rather than a diff: the in-place update
/// path sends the subset the upstream understands, and the rebook path
/// needs everything anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAmendment {
    /// Which order to change
    pub target: OrderRef,
    /// The complete desired booking after the change
    pub booking: BookingRequest,
}

impl BookingAmendment {
    /// Create an amendment for the given order
    #[must_use]
    pub fn new(target: OrderRef, booking: BookingRequest) -> Self {
        Self { target, booking }
    }
}
