//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// Phone number missing or unusable after normalization
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Coordinates outside the valid lat/lng range
    #[error("Invalid coordinates: lat {latitude}, lng {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Booking identity carries neither an order id nor a job id
    #[error("Booking reference needs an order id or a job id")]
    MissingIdentifier,

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Date/time out of range or unparsable
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_phone_error_message() {
        let err = DomainError::InvalidPhoneNumber("empty".to_string());
        assert_eq!(err.to_string(), "Invalid phone number: empty");
    }

    #[test]
    fn invalid_coordinates_error_message() {
        let err = DomainError::InvalidCoordinates {
            latitude: 95.0,
            longitude: 0.0,
        };
        assert!(err.to_string().contains("95"));
    }

    #[test]
    fn missing_identifier_error_message() {
        let err = DomainError::MissingIdentifier;
        assert!(err.to_string().contains("order id"));
        assert!(err.to_string().contains("job id"));
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("pickup address is required".to_string());
        assert_eq!(
            err.to_string(),
            "Validation failed: pickup address is required"
        );
    }
}
