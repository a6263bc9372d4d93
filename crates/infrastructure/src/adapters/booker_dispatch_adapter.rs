//! Booker dispatch adapter - Implements `DispatchPort` using `integration_booker`

use application::ports::{
    AmendmentMethod, AmendmentOutcome, BookingConfirmation, BookingStatus, DispatchError,
    DispatchPort, DriverAssignment, StatusReport,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{BookingAmendment, BookingRequest, OrderRef, PaymentMethod};
use integration_booker::{
    AmendmentCoordinator, AmendmentMethod as WireAmendmentMethod, BookerClient, BookerConfig,
    BookerError, CancelOutcome, JobStatus, OrderApi, OrderDocument, OrderUpdate, PassengerItem,
    ReturnTripLinker, RouteGraph, RouteGraphBuilder, RoutePoint, StatusSnapshot, encode_instant,
    encode_timing,
};
use tracing::{debug, instrument, warn};

/// Adapter for the Booker dispatch provider.
///
/// Wraps a [`BookerClient`] and implements [`DispatchPort`] from the
/// application layer: assembles wire order documents from domain bookings,
/// drives the amendment and return-trip flows, and translates
/// integration-level results back into port-level types.
pub struct BookerDispatchAdapter {
    client: BookerClient,
    config: BookerConfig,
}

impl std::fmt::Debug for BookerDispatchAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookerDispatchAdapter")
            .field("client", &"BookerClient")
            .field("config", &self.config)
            .finish()
    }
}

impl BookerDispatchAdapter {
    /// Create a new adapter from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: BookerConfig) -> Result<Self, DispatchError> {
        let client = BookerClient::new(&config).map_err(Self::map_error)?;
        Ok(Self { client, config })
    }

    // -- wire document assembly -------------------------------------------

    /// Build the single-passenger item list for a booking.
    fn build_items(request: &BookingRequest) -> Vec<PassengerItem> {
        vec![PassengerItem {
            kind: PassengerItem::KIND.to_string(),
            name: request.passenger.name.clone(),
            phone: request.passenger.phone.as_str().to_string(),
            email: request
                .passenger
                .email
                .as_ref()
                .map(|email| email.as_str().to_string()),
            seats: request.occupancy.seats,
            luggage: request.occupancy.luggage,
            wheelchair: request.occupancy.wheelchair,
            payment: Self::payment_hint(request.payment).to_string(),
        }]
    }

    /// Build the route graph, substituting the configured fallback
    /// position for endpoints that never geocoded.
    fn build_route(&self, request: &BookingRequest) -> RouteGraph {
        let pickup = RoutePoint::resolve(&request.pickup, self.config.fallback_location);
        let dropoff = RoutePoint::resolve(&request.dropoff, self.config.fallback_location);

        RouteGraphBuilder::new()
            .with_stop_action(self.config.stop_action)
            .build(
                &pickup,
                &request.stops,
                &dropoff,
                encode_timing(&request.timing),
                &request.notes,
            )
    }

    /// Assemble a complete order document for a booking.
    fn build_document(&self, request: &BookingRequest) -> OrderDocument {
        OrderDocument {
            company_id: self.config.company_id.clone(),
            provider_id: self.config.provider_id.clone(),
            items: Self::build_items(request),
            route: self.build_route(request),
        }
    }

    /// Assemble the partial payload for an in-place update.
    fn build_update(&self, request: &BookingRequest) -> OrderUpdate {
        OrderUpdate {
            company_id: self.config.company_id.clone(),
            items: Some(Self::build_items(request)),
            route: Some(self.build_route(request)),
        }
    }

    // -- error / data mapping helpers -------------------------------------

    /// Map [`BookerError`] to [`DispatchError`].
    fn map_error(error: BookerError) -> DispatchError {
        match error {
            BookerError::ValidationFailed(msg) => DispatchError::ValidationFailed(msg),
            BookerError::MissingIdentifier => DispatchError::MissingIdentifier,
            BookerError::CredentialUnavailable(msg) => DispatchError::CredentialUnavailable(msg),
            BookerError::AuthenticationFailed(msg) => DispatchError::AuthenticationFailed(msg),
            BookerError::AccessDenied(msg) => DispatchError::AccessDenied(msg),
            BookerError::NotFound(msg) => DispatchError::NotFound(msg),
            BookerError::MalformedResponse(msg) => DispatchError::MalformedResponse(msg),
            BookerError::ServiceUnavailable(msg) => DispatchError::ServiceUnavailable(msg),
            BookerError::UpstreamInternalError(msg) => DispatchError::UpstreamInternalError(msg),
            BookerError::UpstreamServerError { status, detail } => {
                DispatchError::UpstreamServerError { status, detail }
            },
            BookerError::Transport { kind, detail } => {
                DispatchError::Transport(format!("{kind}: {detail}"))
            },
            BookerError::PartiallyFailed { cancelled, reason } => {
                DispatchError::PartiallyFailed { cancelled, reason }
            },
        }
    }

    /// Convert a wire job status to the port-level booking status.
    const fn convert_status(status: JobStatus) -> BookingStatus {
        match status {
            JobStatus::Pending => BookingStatus::Pending,
            JobStatus::Assigned => BookingStatus::Accepted,
            JobStatus::EnRoute => BookingStatus::EnRoute,
            JobStatus::Arrived => BookingStatus::Arrived,
            JobStatus::InProgress => BookingStatus::InProgress,
            JobStatus::Completed => BookingStatus::Completed,
            JobStatus::Cancelled => BookingStatus::Cancelled,
            JobStatus::NotFound => BookingStatus::NotFound,
            JobStatus::Unknown => BookingStatus::Unknown,
        }
    }

    /// Convert a wire amendment method to the port-level method.
    const fn convert_method(method: WireAmendmentMethod) -> AmendmentMethod {
        match method {
            WireAmendmentMethod::DirectUpdate => AmendmentMethod::DirectUpdate,
            WireAmendmentMethod::CancelAndRebook => AmendmentMethod::CancelAndRebook,
        }
    }

    /// Convert a status snapshot to a port-level report.
    fn convert_report(snapshot: StatusSnapshot) -> StatusReport {
        StatusReport {
            status: Self::convert_status(snapshot.status),
            driver: snapshot.driver.map(|driver| DriverAssignment {
                name: driver.name,
                vehicle: driver.vehicle,
            }),
        }
    }

    /// Payment hint string the wire format expects.
    const fn payment_hint(payment: PaymentMethod) -> &'static str {
        match payment {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Account => "account",
        }
    }
}

#[async_trait]
impl DispatchPort for BookerDispatchAdapter {
    #[instrument(skip(self, request), fields(timing = %request.timing))]
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, DispatchError> {
        debug!(pickup = %request.pickup.address, "Submitting order to Booker");

        let document = self.build_document(request);
        let order_ref = self
            .client
            .create_order(&document)
            .await
            .map_err(Self::map_error)?;

        debug!(order = %order_ref, "Order accepted");
        Ok(BookingConfirmation::new(order_ref))
    }

    #[instrument(skip(self, amendment), fields(target = %amendment.target))]
    async fn amend_booking(
        &self,
        amendment: &BookingAmendment,
    ) -> Result<AmendmentOutcome, DispatchError> {
        let update = self.build_update(&amendment.booking);
        let replacement = self.build_document(&amendment.booking);

        let result = AmendmentCoordinator::new(&self.client)
            .amend(&amendment.target, &update, &replacement)
            .await
            .map_err(Self::map_error)?;

        if result.replaced.is_some() {
            warn!(order = %result.order_ref, "Amendment escalated to cancel-and-rebook");
        }

        Ok(AmendmentOutcome {
            attempt_id: result.attempt_id,
            method: Self::convert_method(result.method),
            order_ref: result.order_ref,
            replaced: result.replaced,
        })
    }

    #[instrument(skip(self))]
    async fn cancel_booking(
        &self,
        order_ref: &OrderRef,
        reason: &str,
    ) -> Result<(), DispatchError> {
        let outcome = self
            .client
            .cancel_order(&order_ref.api_id(), reason)
            .await
            .map_err(Self::map_error)?;

        if outcome == CancelOutcome::AlreadyGone {
            debug!(order = %order_ref, "Order was already gone upstream");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn booking_status(&self, order_ref: &OrderRef) -> Result<StatusReport, DispatchError> {
        let snapshot = self
            .client
            .order_status(&order_ref.api_id())
            .await
            .map_err(Self::map_error)?;

        Ok(Self::convert_report(snapshot))
    }

    #[instrument(skip(self, trip), fields(return_at = %return_at))]
    async fn book_return_trip(
        &self,
        outbound: &OrderRef,
        trip: &BookingRequest,
        return_at: DateTime<Utc>,
    ) -> Result<BookingConfirmation, DispatchError> {
        debug!(outbound = %outbound, "Booking return trip");

        let document = self.build_document(trip);
        let order_ref = ReturnTripLinker::new(&self.client)
            .book_return(outbound, &document, encode_instant(return_at))
            .await
            .map_err(Self::map_error)?;

        Ok(BookingConfirmation::new(order_ref))
    }

    async fn is_available(&self) -> bool {
        self.client.is_available().await
    }
}
