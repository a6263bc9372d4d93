//! Dispatch provider port
//!
//! Defines the interface for booking ground-transport jobs through an
//! external dispatch provider. The adapter in the infrastructure layer
//! implements this port against the provider's wire API.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{BookingAmendment, BookingRequest, OrderRef};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Dispatch port errors
///
/// Mirrors the provider integration taxonomy so callers can distinguish
/// retryable outages from hard rejections without knowing the wire details.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The provider rejected the booking content
    #[error("Booking rejected: {0}")]
    ValidationFailed(String),

    /// The provider accepted an order but returned nothing to track it by
    #[error("Provider accepted the order but returned no usable identifier")]
    MissingIdentifier,

    /// No credential could be obtained for the provider
    #[error("Credentials unavailable: {0}")]
    CredentialUnavailable(String),

    /// The provider refused our credential
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Authenticated but not allowed to perform the operation
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The referenced order does not exist upstream
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The provider answered with something we could not interpret
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// The provider is up but not serving the API
    #[error("Dispatch service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The provider crashed while handling the request
    #[error("Provider internal fault: {0}")]
    UpstreamInternalError(String),

    /// Any other upstream server failure
    #[error("Provider returned HTTP {status}: {detail}")]
    UpstreamServerError {
        /// HTTP status code
        status: u16,
        /// Response body snippet
        detail: String,
    },

    /// The request never completed at the network level
    #[error("Transport failure: {0}")]
    Transport(String),

    /// An amendment cancelled the original order but could not rebook
    ///
    /// The passenger currently has no active booking. Must reach an
    /// operator; never collapse this into a generic failure.
    #[error("Amendment incomplete: order {cancelled} was cancelled but rebooking failed: {reason}")]
    PartiallyFailed {
        /// Display id of the order that was cancelled
        cancelled: String,
        /// Why the replacement booking failed
        reason: String,
    },
}

impl DispatchError {
    /// Whether retrying the same call later could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CredentialUnavailable(_)
                | Self::ServiceUnavailable(_)
                | Self::UpstreamServerError { .. }
                | Self::Transport(_)
        )
    }

    /// Whether this is the amendment partial-failure case
    ///
    /// Callers route these to an operator because the passenger is left
    /// without an active booking.
    #[must_use]
    pub const fn is_partial_failure(&self) -> bool {
        matches!(self, Self::PartiallyFailed { .. })
    }
}

/// Confirmation of an order accepted by the dispatch provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Identifiers the provider returned for the new order
    pub order_ref: OrderRef,
}

impl BookingConfirmation {
    /// Wrap provider identifiers in a confirmation
    #[must_use]
    pub const fn new(order_ref: OrderRef) -> Self {
        Self { order_ref }
    }

    /// Identifier suitable for showing to operators and passengers
    #[must_use]
    pub fn display_id(&self) -> String {
        self.order_ref.display_id()
    }
}

/// How an amendment was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendmentMethod {
    /// The provider applied the change to the existing order
    DirectUpdate,
    /// The original order was cancelled and a replacement created
    CancelAndRebook,
}

impl fmt::Display for AmendmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectUpdate => write!(f, "direct-update"),
            Self::CancelAndRebook => write!(f, "cancel-and-rebook"),
        }
    }
}

/// Result of a completed amendment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentOutcome {
    /// Unique id for this amendment attempt, for audit trails
    pub attempt_id: Uuid,
    /// How the change was achieved
    pub method: AmendmentMethod,
    /// The order that now represents the booking
    pub order_ref: OrderRef,
    /// The original order, when a replacement was created
    pub replaced: Option<OrderRef>,
}

/// Lifecycle state of a dispatched booking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Accepted but not yet assigned
    Pending,
    /// Assigned to a driver
    Accepted,
    /// Driver on the way to the pickup
    EnRoute,
    /// Driver waiting at the pickup
    Arrived,
    /// Passenger on board
    InProgress,
    /// Trip finished
    Completed,
    /// Cancelled, by us or upstream
    Cancelled,
    /// The provider no longer knows the order
    NotFound,
    /// The provider reported a state we do not recognize
    #[default]
    Unknown,
}

impl BookingStatus {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::EnRoute => "En route",
            Self::Arrived => "At pickup",
            Self::InProgress => "On board",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NotFound => "Not found",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the booking can still change state
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NotFound)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Driver assigned to a booking, as far as the provider shares it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverAssignment {
    /// Driver display name
    pub name: Option<String>,
    /// Vehicle description or registration
    pub vehicle: Option<String>,
}

impl DriverAssignment {
    /// Format as "name (vehicle)" with fallbacks for missing parts
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.name.as_deref(), self.vehicle.as_deref()) {
            (Some(name), Some(vehicle)) => format!("{name} ({vehicle})"),
            (Some(name), None) => name.to_string(),
            (None, Some(vehicle)) => format!("Unnamed driver ({vehicle})"),
            (None, None) => String::from("Unassigned"),
        }
    }
}

/// Point-in-time view of a booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Current lifecycle state
    pub status: BookingStatus,
    /// Assigned driver, when one is known
    pub driver: Option<DriverAssignment>,
}

impl StatusReport {
    /// Compact one-line summary for operator-facing messages
    #[must_use]
    pub fn summary(&self) -> String {
        self.driver.as_ref().map_or_else(
            || self.status.label().to_string(),
            |driver| format!("{}, driver: {}", self.status.label(), driver.describe()),
        )
    }
}

/// Port for dispatch provider operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DispatchPort: Send + Sync {
    /// Submit a booking and return the provider's identifiers
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, DispatchError>;

    /// Change an existing booking, escalating to cancel-and-rebook if needed
    async fn amend_booking(
        &self,
        amendment: &BookingAmendment,
    ) -> Result<AmendmentOutcome, DispatchError>;

    /// Cancel a booking; an order already gone upstream counts as cancelled
    async fn cancel_booking(
        &self,
        order_ref: &OrderRef,
        reason: &str,
    ) -> Result<(), DispatchError>;

    /// Fetch the current state of a booking
    ///
    /// An order unknown upstream yields a `NotFound` status, not an error.
    async fn booking_status(&self, order_ref: &OrderRef) -> Result<StatusReport, DispatchError>;

    /// Book the reverse of an already-confirmed trip as a linked order
    ///
    /// The engine is stateless, so the outbound trip is passed back in for
    /// reversal rather than looked up.
    async fn book_return_trip(
        &self,
        outbound: &OrderRef,
        trip: &BookingRequest,
        return_at: DateTime<Utc>,
    ) -> Result<BookingConfirmation, DispatchError>;

    /// Check whether the provider endpoint is reachable
    async fn is_available(&self) -> bool;
}
