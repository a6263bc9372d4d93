//! Linked return-trip booking
//!
//! A booking with a return time gets a second, independent order with the
//! endpoints swapped: the outbound dropoff becomes the return pickup. The
//! return order's pickup node carries a back-reference to the outbound so
//! dispatchers can see the pairing; nothing upstream links them otherwise.
//! Failure to place the return is the caller's to soften; the outbound
//! booking already exists and must not be rolled back over it.

use std::fmt;

use domain::OrderRef;
use tracing::{debug, instrument};

use crate::client::OrderApi;
use crate::codec::ASAP_EPOCH;
use crate::error::BookerError;
use crate::models::{
    ArrivalSpec, NodeAction, OrderDocument, RouteGraph, RouteLeg, RouteMeta, RouteNode,
};

/// Build the reversed order document for a return trip
///
/// Takes the first and last node of the outbound route (intermediate
/// stops are not revisited on the way back), swaps them, and pins the
/// return departure to `return_epoch`. Passenger items and company
/// identity carry over unchanged.
///
/// # Errors
///
/// Returns [`BookerError::ValidationFailed`] when the outbound route has
/// fewer than two nodes and so cannot be reversed.
pub fn reversed_document(
    outbound: &OrderRef,
    order: &OrderDocument,
    return_epoch: i64,
) -> Result<OrderDocument, BookerError> {
    let (Some(first), Some(last)) = (order.route.pickup(), order.route.dropoff()) else {
        return Err(BookerError::ValidationFailed(
            "outbound route has no endpoints to reverse".to_string(),
        ));
    };
    if order.route.nodes.len() < 2 {
        return Err(BookerError::ValidationFailed(
            "outbound route has a single node, nothing to reverse".to_string(),
        ));
    }

    let pickup = RouteNode {
        seq: 0,
        name: last.name.clone(),
        lat: last.lat,
        lng: last.lng,
        actions: vec![NodeAction::Enter],
        arrival: (return_epoch != ASAP_EPOCH).then_some(ArrivalSpec {
            target: return_epoch,
        }),
        info: format!("Return of order {}", outbound.display_id()),
    };
    let dropoff = RouteNode {
        seq: 1,
        name: first.name.clone(),
        lat: first.lat,
        lng: first.lng,
        actions: vec![NodeAction::Exit],
        arrival: None,
        info: String::new(),
    };
    let leg = RouteLeg {
        from_node: 0,
        to_node: 1,
        coords: [pickup.lng, pickup.lat, dropoff.lng, dropoff.lat],
        distance: 0,
        duration: 0,
    };

    Ok(OrderDocument {
        company_id: order.company_id.clone(),
        provider_id: order.provider_id.clone(),
        items: order.items.clone(),
        route: RouteGraph {
            nodes: vec![pickup, dropoff],
            legs: vec![leg],
            meta: RouteMeta::default(),
        },
    })
}

/// Books return trips linked to an existing outbound order
pub struct ReturnTripLinker<'a> {
    client: &'a dyn OrderApi,
}

impl fmt::Debug for ReturnTripLinker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnTripLinker").finish_non_exhaustive()
    }
}

impl<'a> ReturnTripLinker<'a> {
    /// Create a linker over an order API client
    #[must_use]
    pub const fn new(client: &'a dyn OrderApi) -> Self {
        Self { client }
    }

    /// Book the return leg for a confirmed outbound order
    ///
    /// # Errors
    ///
    /// Propagates creation errors; the caller decides whether that is
    /// fatal (for linked returns it is reported as a warning alongside
    /// the outbound confirmation).
    #[instrument(skip(self, outbound_order), fields(outbound = %outbound.display_id()))]
    pub async fn book_return(
        &self,
        outbound: &OrderRef,
        outbound_order: &OrderDocument,
        return_epoch: i64,
    ) -> Result<OrderRef, BookerError> {
        let document = reversed_document(outbound, outbound_order, return_epoch)?;
        let reference = self.client.create_order(&document).await?;
        debug!(return_order = %reference, "Return trip booked");
        Ok(reference)
    }
}
