//! Booker dispatch API integration for Corbière
//!
//! Translates bookings into the wire format of the Booker dispatch API
//! and reconciles its inconsistent responses into typed results. The
//! upstream carries coordinates as scaled integers, returns order
//! identifiers in two different shapes, purges finished jobs (404 is a
//! status, not an error), and reports failures as anything from JSON
//! error arrays to leaked .NET stack traces.
//!
//! # Architecture
//!
//! The crate follows the client-trait pattern of the other integration
//! crates. [`OrderApi`] defines the four order operations, implemented by
//! [`BookerClient`]. On top of the client sit the flows with their own
//! invariants: [`AmendmentCoordinator`] walks the update/patch/cancel/
//! rebook escalation, and [`ReturnTripLinker`] books the reversed leg of
//! a linked return. [`RouteGraphBuilder`] produces the node/leg graph,
//! [`TokenManager`] caches bearer credentials with a single-flight
//! refresh.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_booker::{BookerClient, BookerConfig, OrderApi, RouteGraphBuilder, RoutePoint};
//!
//! let config = BookerConfig::default();
//! let client = BookerClient::new(&config)?;
//!
//! let route = RouteGraphBuilder::new().build(
//!     &RoutePoint::new("Liberation Station", st_helier),
//!     &[],                  // no intermediate stops
//!     &RoutePoint::new("Jersey Airport", airport),
//!     0,                    // depart as soon as possible
//!     "Flight BA2772",
//! );
//! ```

mod amendment;
mod classify;
mod client;
mod codec;
mod config;
mod error;
mod models;
mod return_trip;
mod route;
mod token;

pub use amendment::{AMEND_CANCEL_REASON, AmendmentCoordinator, AmendmentMethod, AmendmentResult};
pub use classify::{classify_response, classify_transport, looks_like_html, looks_like_stack_trace};
pub use client::{BookerClient, OrderApi, UpdateMethod};
pub use codec::{
    ASAP_EPOCH, COORDINATE_SCALE, decode_location, encode_instant, encode_location, encode_timing,
    scale_degrees,
};
pub use config::BookerConfig;
pub use error::{BookerError, TransportKind};
pub use models::{
    ArrivalSpec, CancelOutcome, DriverInfo, JobStatus, NodeAction, OrderDocument, OrderUpdate,
    PassengerItem, RouteGraph, RouteLeg, RouteMeta, RouteNode, StatusSnapshot, StopAction,
    UpdateOutcome,
};
pub use return_trip::{ReturnTripLinker, reversed_document};
pub use route::{RouteGraphBuilder, RoutePoint};
pub use token::{FALLBACK_LIFETIME_MINS, STALENESS_MARGIN_SECS, TokenManager};
