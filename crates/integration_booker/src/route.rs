//! Route graph construction
//!
//! Turns a trip (pickup, intermediate stops, dropoff) into the node/leg
//! graph the Booker API expects. The passenger boards at node 0 (`enter`)
//! and leaves at the last node (`exit`); every intermediate stop becomes
//! one node in visit order. Stops that never resolved to coordinates are
//! dropped from the route rather than failing the whole booking.

use domain::{GeoLocation, TripEndpoint};
use tracing::debug;

use crate::codec::{ASAP_EPOCH, encode_location};
use crate::models::{
    ArrivalSpec, NodeAction, RouteGraph, RouteLeg, RouteMeta, RouteNode, StopAction,
};

/// A trip endpoint whose position is known
///
/// Pickup and dropoff must always be placeable; callers resolve missing
/// geocoding to a regional fallback before building the route.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePoint {
    /// Display name shown to the driver
    pub name: String,
    /// Resolved position
    pub location: GeoLocation,
}

impl RoutePoint {
    /// Create a route point from a name and position
    #[must_use]
    pub fn new(name: impl Into<String>, location: GeoLocation) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    /// Resolve a trip endpoint, substituting the fallback position when
    /// geocoding never produced one
    #[must_use]
    pub fn resolve(endpoint: &TripEndpoint, fallback: GeoLocation) -> Self {
        Self {
            name: endpoint.address.clone(),
            location: endpoint.location_or(fallback),
        }
    }
}

/// Builds Booker route graphs from trip endpoints
#[derive(Debug, Clone, Default)]
pub struct RouteGraphBuilder {
    stop_action: StopAction,
}

impl RouteGraphBuilder {
    /// Create a builder with the default stop handling (`waypoint`)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how intermediate stops are marked on the wire
    #[must_use]
    pub const fn with_stop_action(mut self, action: StopAction) -> Self {
        self.stop_action = action;
        self
    }

    /// Build the route graph for a trip
    ///
    /// `pickup_epoch` is the wire-encoded departure time; an arrival block
    /// is attached to the pickup node only when it is non-zero. `notes`
    /// ride on the pickup node's info field. Intermediate stops missing an
    /// address or coordinates are dropped. A trip with K usable stops
    /// produces K+2 nodes and K+1 legs, sequence-numbered contiguously.
    #[must_use]
    pub fn build(
        &self,
        pickup: &RoutePoint,
        stops: &[TripEndpoint],
        dropoff: &RoutePoint,
        pickup_epoch: i64,
        notes: &str,
    ) -> RouteGraph {
        let mut nodes = Vec::with_capacity(stops.len() + 2);

        let (lng, lat) = encode_location(pickup.location);
        nodes.push(RouteNode {
            seq: 0,
            name: pickup.name.clone(),
            lat,
            lng,
            actions: vec![NodeAction::Enter],
            arrival: (pickup_epoch != ASAP_EPOCH).then_some(ArrivalSpec {
                target: pickup_epoch,
            }),
            info: notes.trim().to_string(),
        });

        for stop in stops {
            let Some(location) = stop.location else {
                debug!(address = %stop.address, "Dropping stop without coordinates");
                continue;
            };
            if stop.address.trim().is_empty() {
                debug!("Dropping stop without an address");
                continue;
            }

            let (lng, lat) = encode_location(location);
            #[allow(clippy::cast_possible_truncation)] // routes are a handful of nodes
            let seq = nodes.len() as u32;
            nodes.push(RouteNode {
                seq,
                name: stop.address.clone(),
                lat,
                lng,
                actions: vec![self.stop_action.node_action()],
                arrival: None,
                info: String::new(),
            });
        }

        let (lng, lat) = encode_location(dropoff.location);
        #[allow(clippy::cast_possible_truncation)]
        let seq = nodes.len() as u32;
        nodes.push(RouteNode {
            seq,
            name: dropoff.name.clone(),
            lat,
            lng,
            actions: vec![NodeAction::Exit],
            arrival: None,
            info: String::new(),
        });

        let legs = nodes
            .windows(2)
            .map(|pair| RouteLeg {
                from_node: pair[0].seq,
                to_node: pair[1].seq,
                coords: [pair[0].lng, pair[0].lat, pair[1].lng, pair[1].lat],
                distance: 0,
                duration: 0,
            })
            .collect();

        RouteGraph {
            nodes,
            legs,
            meta: RouteMeta::default(),
        }
    }
}
