//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod booker_dispatch_adapter;

pub use booker_dispatch_adapter::BookerDispatchAdapter;
