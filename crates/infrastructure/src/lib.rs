//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the Booker dispatch
//! adapter, configuration loading, and telemetry setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, BookerSettings, GeoLocationConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_tracing};
