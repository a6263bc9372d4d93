//! Booking service
//!
//! Orchestrates booking creation, amendments, cancellation, and status
//! queries against the dispatch port. Return trips are booked as a second,
//! linked order after the outbound succeeds; a return failure never undoes
//! the outbound booking.

use std::{fmt, sync::Arc};

use domain::{BookingAmendment, BookingRequest, OrderRef};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{AmendmentOutcome, BookingConfirmation, DispatchPort, StatusReport},
};

/// Result of booking a trip, including an optional linked return
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    /// The confirmed outbound order
    pub confirmation: BookingConfirmation,
    /// The confirmed return order, when one was requested and succeeded
    pub return_trip: Option<BookingConfirmation>,
    /// Set when a requested return trip could not be booked
    pub warning: Option<String>,
}

/// Booking service for dispatching ground-transport trips
pub struct BookingService {
    dispatch_port: Arc<dyn DispatchPort>,
}

impl fmt::Debug for BookingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingService").finish_non_exhaustive()
    }
}

impl BookingService {
    /// Create a new booking service
    pub fn new(dispatch_port: Arc<dyn DispatchPort>) -> Self {
        Self { dispatch_port }
    }

    /// Book a trip, plus its linked return when one is requested
    ///
    /// The return trip is booked only after the outbound order is
    /// confirmed. If the return fails, the outbound confirmation is still
    /// returned with a warning; the caller decides whether to retry.
    ///
    /// # Errors
    ///
    /// Returns a domain validation error for an unusable request, or the
    /// dispatch error for a failed outbound booking.
    #[instrument(skip(self, request))]
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, ApplicationError> {
        request.validate()?;

        info!(
            passenger = %request.passenger.name,
            timing = %request.timing,
            stops = request.stops.len(),
            "Booking trip"
        );
        let confirmation = self.dispatch_port.create_booking(request).await?;
        info!(order = %confirmation.order_ref, "Trip booked");

        let Some(return_at) = request.return_at else {
            return Ok(BookingOutcome {
                confirmation,
                return_trip: None,
                warning: None,
            });
        };

        match self
            .dispatch_port
            .book_return_trip(&confirmation.order_ref, request, return_at)
            .await
        {
            Ok(return_confirmation) => {
                info!(order = %return_confirmation.order_ref, "Return trip booked");
                Ok(BookingOutcome {
                    confirmation,
                    return_trip: Some(return_confirmation),
                    warning: None,
                })
            },
            Err(err) => {
                warn!(error = %err, "Return trip failed; outbound order stands");
                Ok(BookingOutcome {
                    confirmation,
                    return_trip: None,
                    warning: Some(format!("Return trip could not be booked: {err}")),
                })
            },
        }
    }

    /// Amend an already-dispatched booking
    ///
    /// # Errors
    ///
    /// Returns a domain validation error for an unusable replacement
    /// booking, or the dispatch error. A partial failure (original
    /// cancelled, rebook failed) passes through untranslated.
    #[instrument(skip(self, amendment), fields(target = %amendment.target))]
    pub async fn amend(
        &self,
        amendment: &BookingAmendment,
    ) -> Result<AmendmentOutcome, ApplicationError> {
        amendment.booking.validate()?;

        info!("Amending booking");
        let outcome = self.dispatch_port.amend_booking(amendment).await?;
        info!(
            method = %outcome.method,
            order = %outcome.order_ref,
            "Amendment complete"
        );
        Ok(outcome)
    }

    /// Cancel a booking
    ///
    /// # Errors
    ///
    /// Returns the dispatch error; an order already gone upstream is
    /// treated as a successful cancellation by the port.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        order_ref: &OrderRef,
        reason: &str,
    ) -> Result<(), ApplicationError> {
        info!(order = %order_ref, reason, "Cancelling booking");
        self.dispatch_port.cancel_booking(order_ref, reason).await?;
        Ok(())
    }

    /// Fetch the current state of a booking
    ///
    /// # Errors
    ///
    /// Returns the dispatch error for transport or provider failures; an
    /// order unknown upstream yields a not-found status instead.
    #[instrument(skip(self))]
    pub async fn status(&self, order_ref: &OrderRef) -> Result<StatusReport, ApplicationError> {
        debug!(order = %order_ref, "Fetching booking status");
        Ok(self.dispatch_port.booking_status(order_ref).await?)
    }

    /// Check whether the dispatch provider is reachable
    pub async fn is_available(&self) -> bool {
        self.dispatch_port.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use domain::{GeoLocation, Passenger, PhoneNumber, TripEndpoint};

    use super::*;
    use crate::ports::{
        AmendmentMethod, BookingStatus, DispatchError, DriverAssignment, MockDispatchPort,
    };

    fn sample_request() -> BookingRequest {
        BookingRequest::new(
            Passenger::new(
                "Ada Le Brun",
                PhoneNumber::normalized("07797 123456", "44").unwrap(),
            ),
            TripEndpoint::new("Liberation Station, St Helier")
                .with_location(GeoLocation::st_helier()),
            TripEndpoint::new("Jersey Airport").with_location(GeoLocation::jersey_airport()),
        )
    }

    fn confirmation(job_id: u64) -> BookingConfirmation {
        BookingConfirmation::new(OrderRef::from_job_id(job_id))
    }

    #[tokio::test]
    async fn book_without_return_creates_one_order() {
        let mut port = MockDispatchPort::new();
        port.expect_create_booking()
            .times(1)
            .returning(|_| Ok(confirmation(84512)));
        port.expect_book_return_trip().times(0);

        let service = BookingService::new(Arc::new(port));
        let outcome = service.book(&sample_request()).await.unwrap();

        assert_eq!(outcome.confirmation.display_id(), "84512");
        assert!(outcome.return_trip.is_none());
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn book_with_return_creates_two_orders() {
        let mut port = MockDispatchPort::new();
        port.expect_create_booking()
            .times(1)
            .returning(|_| Ok(confirmation(84512)));
        port.expect_book_return_trip()
            .times(1)
            .returning(|_, _, _| Ok(confirmation(84513)));

        let service = BookingService::new(Arc::new(port));
        let request = sample_request()
            .with_return_at(Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap());
        let outcome = service.book(&request).await.unwrap();

        assert_eq!(outcome.confirmation.display_id(), "84512");
        assert_eq!(outcome.return_trip.unwrap().display_id(), "84513");
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn return_failure_becomes_warning_not_error() {
        let mut port = MockDispatchPort::new();
        port.expect_create_booking()
            .times(1)
            .returning(|_| Ok(confirmation(84512)));
        port.expect_book_return_trip()
            .times(1)
            .returning(|_, _, _| {
                Err(DispatchError::ServiceUnavailable(
                    "maintenance page".to_string(),
                ))
            });

        let service = BookingService::new(Arc::new(port));
        let request = sample_request()
            .with_return_at(Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap());
        let outcome = service.book(&request).await.unwrap();

        assert_eq!(outcome.confirmation.display_id(), "84512");
        assert!(outcome.return_trip.is_none());
        let warning = outcome.warning.unwrap();
        assert!(warning.contains("Return trip"));
        assert!(warning.contains("maintenance page"));
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_port() {
        let mut port = MockDispatchPort::new();
        port.expect_create_booking().times(0);

        let service = BookingService::new(Arc::new(port));
        let mut request = sample_request();
        request.passenger.name = String::new();

        let err = service.book(&request).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }

    #[tokio::test]
    async fn outbound_failure_is_an_error_not_a_warning() {
        let mut port = MockDispatchPort::new();
        port.expect_create_booking().times(1).returning(|_| {
            Err(DispatchError::ValidationFailed(
                "Pickup address is required".to_string(),
            ))
        });
        port.expect_book_return_trip().times(0);

        let service = BookingService::new(Arc::new(port));
        let request = sample_request()
            .with_return_at(Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap());

        let err = service.book(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Dispatch(DispatchError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn amend_passes_outcome_through() {
        let mut port = MockDispatchPort::new();
        port.expect_amend_booking().times(1).returning(|amendment| {
            Ok(AmendmentOutcome {
                attempt_id: uuid::Uuid::new_v4(),
                method: AmendmentMethod::DirectUpdate,
                order_ref: amendment.target.clone(),
                replaced: None,
            })
        });

        let service = BookingService::new(Arc::new(port));
        let amendment = BookingAmendment::new(OrderRef::from_job_id(84512), sample_request());

        let outcome = service.amend(&amendment).await.unwrap();
        assert_eq!(outcome.method, AmendmentMethod::DirectUpdate);
        assert_eq!(outcome.order_ref.display_id(), "84512");
    }

    #[tokio::test]
    async fn amend_keeps_partial_failure_identity() {
        let mut port = MockDispatchPort::new();
        port.expect_amend_booking().times(1).returning(|_| {
            Err(DispatchError::PartiallyFailed {
                cancelled: "84512".to_string(),
                reason: "provider 503".to_string(),
            })
        });

        let service = BookingService::new(Arc::new(port));
        let amendment = BookingAmendment::new(OrderRef::from_job_id(84512), sample_request());

        let err = service.amend(&amendment).await.unwrap_err();
        assert!(err.is_partial_failure());
        assert!(err.to_string().contains("84512"));
    }

    #[tokio::test]
    async fn amend_with_invalid_booking_never_reaches_the_port() {
        let mut port = MockDispatchPort::new();
        port.expect_amend_booking().times(0);

        let service = BookingService::new(Arc::new(port));
        let mut booking = sample_request();
        booking.occupancy.seats = 0;
        let amendment = BookingAmendment::new(OrderRef::from_job_id(84512), booking);

        let err = service.amend(&amendment).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }

    #[tokio::test]
    async fn cancel_passes_reason_through() {
        let mut port = MockDispatchPort::new();
        port.expect_cancel_booking()
            .withf(|order_ref, reason| {
                order_ref.display_id() == "84512" && reason == "Passenger request"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = BookingService::new(Arc::new(port));
        service
            .cancel(&OrderRef::from_job_id(84512), "Passenger request")
            .await
            .unwrap();
    }

    #[test]
    fn status_passthrough_with_driver() {
        let mut port = MockDispatchPort::new();
        port.expect_booking_status().times(1).returning(|_| {
            Ok(StatusReport {
                status: BookingStatus::EnRoute,
                driver: Some(DriverAssignment {
                    name: Some("Pat Vautier".to_string()),
                    vehicle: None,
                }),
            })
        });

        let service = BookingService::new(Arc::new(port));
        let report =
            tokio_test::block_on(service.status(&OrderRef::from_job_id(84512))).unwrap();
        assert_eq!(report.status, BookingStatus::EnRoute);
        assert_eq!(report.summary(), "En route, driver: Pat Vautier");
    }

    #[tokio::test]
    async fn is_available_passthrough() {
        let mut port = MockDispatchPort::new();
        port.expect_is_available().times(1).returning(|| false);

        let service = BookingService::new(Arc::new(port));
        assert!(!service.is_available().await);
    }

    #[test]
    fn service_debug_is_opaque() {
        let port = MockDispatchPort::new();
        let service = BookingService::new(Arc::new(port));
        assert!(format!("{service:?}").contains("BookingService"));
    }
}
