//! Value objects - immutable, identity-less booking primitives

mod email_address;
mod geo_location;
mod order_ref;
mod phone_number;

pub use email_address::EmailAddress;
pub use geo_location::{GeoLocation, InvalidCoordinates};
pub use order_ref::OrderRef;
pub use phone_number::PhoneNumber;
