//! Booker wire-format models
//!
//! Typed representations of the order document the Booker API accepts and
//! of the snapshots it returns. Coordinates here are already provider-scale
//! integers (degrees × 1,000,000); conversion lives in [`crate::codec`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dispatch action attached to a route node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    /// Passenger boards at this node (exactly one per route, node 0)
    Enter,
    /// Passenger leaves at this node (exactly one per route, the last node)
    Exit,
    /// Intermediate stop the vehicle waits at
    Waypoint,
    /// Intermediate point passed through without waiting
    Via,
}

/// How intermediate stops are marked on the wire
///
/// Fleet configurations differ in whether they dispatch stops as waiting
/// points or pass-throughs, so the choice is configuration rather than a
/// constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopAction {
    /// Emit intermediate stops as `waypoint` (vehicle waits)
    #[default]
    Waypoint,
    /// Emit intermediate stops as `via` (pass-through)
    Via,
}

impl StopAction {
    /// The wire action this choice maps to
    #[must_use]
    pub const fn node_action(self) -> NodeAction {
        match self {
            Self::Waypoint => NodeAction::Waypoint,
            Self::Via => NodeAction::Via,
        }
    }
}

/// Requested arrival constraint on a node
///
/// Absent entirely when the pickup is unconstrained; a zero target is never
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalSpec {
    /// Epoch seconds the vehicle should be at the node
    pub target: i64,
}

/// One point in the route graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNode {
    /// Zero-based position in the route (contiguous)
    pub seq: u32,
    /// Display name shown to the driver
    pub name: String,
    /// Provider-scale latitude
    pub lat: i64,
    /// Provider-scale longitude
    pub lng: i64,
    /// Ordered dispatch actions at this node
    pub actions: Vec<NodeAction>,
    /// Arrival constraint, when the pickup time is fixed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<ArrivalSpec>,
    /// Free-text driver notes attached to this node
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
}

/// A directed connection between two adjacent route nodes
///
/// Distances and durations are submitted as zero; the dispatch side
/// recomputes them from its own road network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Sequence index of the origin node
    #[serde(rename = "from")]
    pub from_node: u32,
    /// Sequence index of the destination node
    #[serde(rename = "to")]
    pub to_node: u32,
    /// Endpoint coordinates as `[fromLng, fromLat, toLng, toLat]`,
    /// provider-scale
    pub coords: [i64; 4],
    /// Road distance in metres (placeholder, recomputed upstream)
    pub distance: u32,
    /// Travel time in seconds (placeholder, recomputed upstream)
    pub duration: u32,
}

/// Route totals (placeholders, recomputed upstream)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    /// Total distance in metres
    pub distance: u32,
    /// Total duration in seconds
    pub duration: u32,
}

/// The node/leg graph describing a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGraph {
    /// Route points in visit order
    pub nodes: Vec<RouteNode>,
    /// Connections between adjacent nodes
    pub legs: Vec<RouteLeg>,
    /// Route totals
    pub meta: RouteMeta,
}

impl RouteGraph {
    /// The pickup node, if the graph is non-empty
    #[must_use]
    pub fn pickup(&self) -> Option<&RouteNode> {
        self.nodes.first()
    }

    /// The dropoff node, if the graph is non-empty
    #[must_use]
    pub fn dropoff(&self) -> Option<&RouteNode> {
        self.nodes.last()
    }
}

/// The passenger entry of an order's item list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerItem {
    /// Item discriminator, always `"passenger"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Passenger name shown to the driver
    pub name: String,
    /// Contact number in normalized `+`-prefixed form
    pub phone: String,
    /// Optional contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Seats required
    pub seats: u8,
    /// Luggage pieces
    pub luggage: u8,
    /// Wheelchair-accessible vehicle required
    pub wheelchair: bool,
    /// Payment hint: `cash`, `card`, or `account`
    pub payment: String,
}

impl PassengerItem {
    /// Item discriminator for passenger entries
    pub const KIND: &'static str = "passenger";
}

/// A complete order as submitted to the Booker API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDocument {
    /// Booking company the order belongs to
    pub company_id: String,
    /// Fleet/provider the order is dispatched through
    pub provider_id: String,
    /// Order items; currently always a single passenger entry
    pub items: Vec<PassengerItem>,
    /// The trip route graph
    pub route: RouteGraph,
}

/// Partial order payload for in-place updates (PUT/PATCH)
///
/// Sections that are `None` are left untouched upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Booking company the order belongs to
    pub company_id: String,
    /// Replacement item list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PassengerItem>>,
    /// Replacement route graph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteGraph>,
}

/// Dispatch state of a job, reconciled from the upstream's vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, no vehicle assigned yet
    Pending,
    /// A vehicle has been assigned
    Assigned,
    /// The vehicle is on its way to the pickup
    EnRoute,
    /// The vehicle is waiting at the pickup
    Arrived,
    /// Passenger on board
    InProgress,
    /// Trip finished
    Completed,
    /// Cancelled, by either side
    Cancelled,
    /// The upstream no longer knows the job; finished jobs are purged,
    /// so this is a valid terminal state rather than an error
    NotFound,
    /// The upstream reported a state outside the known vocabulary
    #[default]
    Unknown,
}

impl JobStatus {
    /// Map an upstream state string onto the known vocabulary
    ///
    /// Matching is lenient: case and separators are ignored, and fleet
    /// vernacular (`pob`, `noshow`) is folded into the nearest state.
    #[must_use]
    pub fn from_wire(state: &str) -> Self {
        let key: String = state
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "pending" | "new" | "queued" | "booked" => Self::Pending,
            "assigned" | "allocated" | "accepted" => Self::Assigned,
            "enroute" | "dispatched" | "ontheway" => Self::EnRoute,
            "arrived" | "atpickup" | "waiting" => Self::Arrived,
            "inprogress" | "pob" | "onboard" | "intransit" => Self::InProgress,
            "completed" | "complete" | "finished" | "cleared" | "done" => Self::Completed,
            "cancelled" | "canceled" | "noshow" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Whether the job will never change state again
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NotFound)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::EnRoute => "en route",
            Self::Arrived => "arrived",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NotFound => "not found",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Assigned driver details, when the upstream includes them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Driver display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Vehicle description (make, colour, plate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
}

/// Point-in-time view of a job's dispatch state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Reconciled dispatch state
    pub status: JobStatus,
    /// Assigned driver, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverInfo>,
}

/// Result of a cancel call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The upstream confirmed the cancellation
    Cancelled,
    /// The order was already absent upstream; treated as success since
    /// the goal state holds either way
    AlreadyGone,
}

/// Result of an in-place update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The upstream confirmed the update with a parseable response
    Applied,
    /// The call completed but the update cannot be considered applied
    Rejected {
        /// Why the outcome does not count as applied
        reason: String,
    },
}
