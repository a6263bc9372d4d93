//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these
//! ports.

mod dispatch_port;

#[cfg(test)]
pub use dispatch_port::MockDispatchPort;
pub use dispatch_port::{
    AmendmentMethod, AmendmentOutcome, BookingConfirmation, BookingStatus, DispatchError,
    DispatchPort, DriverAssignment, StatusReport,
};
