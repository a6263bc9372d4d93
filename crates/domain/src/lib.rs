//! Domain layer for Corbière
//!
//! Core booking entities, value objects, and domain errors for the
//! ground-transport booking engine. This layer has no I/O and defines the
//! ubiquitous language shared by the application, infrastructure, and
//! integration crates.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
