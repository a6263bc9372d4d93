//! Application layer - Use cases and orchestration
//!
//! Contains the booking orchestration services and the port definitions
//! implemented by infrastructure adapters. Depends only on the domain
//! layer; everything provider-specific lives behind the dispatch port.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
