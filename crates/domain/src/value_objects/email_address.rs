//! Email address value object with validation

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::DomainError;

/// A validated, lowercased email address
///
/// Passenger email is optional on a booking; when present it must be a
/// well-formed address because the upstream echoes it into driver-facing
/// job sheets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct EmailAddress {
    #[validate(email)]
    value: String,
}

impl EmailAddress {
    /// Create a new email address, validating the format
    ///
    /// # Errors
    ///
    /// Returns an error if the email format is invalid.
    pub fn new(email: impl Into<String>) -> Result<Self, DomainError> {
        let value = email.into().trim().to_lowercase();

        let candidate = Self { value };
        candidate
            .validate()
            .map_err(|e| DomainError::InvalidEmailAddress(e.to_string()))?;

        Ok(candidate)
    }

    /// Get the email address as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_is_accepted() {
        let email = EmailAddress::new("passenger@example.com").unwrap();
        assert_eq!(email.as_str(), "passenger@example.com");
    }

    #[test]
    fn email_is_lowercased_and_trimmed() {
        let email = EmailAddress::new("  Passenger@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "passenger@example.com");
    }

    #[test]
    fn invalid_email_is_rejected() {
        assert!(EmailAddress::new("not-an-email").is_err());
        assert!(EmailAddress::new("@nodomain.com").is_err());
        assert!(EmailAddress::new("").is_err());
    }

    #[test]
    fn try_from_str() {
        let email: EmailAddress = "a@b.com".try_into().unwrap();
        assert_eq!(email.to_string(), "a@b.com");
    }

    #[test]
    fn serialization_is_transparent() {
        let email = EmailAddress::new("a@b.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"a@b.com\"");
    }
}
