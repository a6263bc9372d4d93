//! Phone number value object with best-effort E.164 normalization
//!
//! The dispatch upstream requires a non-empty, `+`-prefixed number on every
//! passenger item but tolerates loosely formatted digits. Normalization here
//! is therefore best-effort: separators are stripped and a country prefix is
//! synthesized, but digit-level validity is the booking UI's concern and is
//! not re-checked in this layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A best-effort normalized phone number (e.g. +447797123456)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber {
    value: String,
}

impl PhoneNumber {
    /// Normalize a raw number into E.164 shape
    ///
    /// Whitespace, parentheses, and hyphens are stripped. A number without a
    /// leading `+` has its leading `0` replaced by the given country calling
    /// code; a bare number is `+`-prefixed as-is.
    ///
    /// # Errors
    ///
    /// Returns an error only when the input is empty after stripping.
    pub fn normalized(
        raw: impl Into<String>,
        default_country_code: &str,
    ) -> Result<Self, DomainError> {
        let stripped: String = raw
            .into()
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '-'))
            .collect();

        if stripped.is_empty() {
            return Err(DomainError::InvalidPhoneNumber(
                "number is empty".to_string(),
            ));
        }

        let value = if stripped.starts_with('+') {
            stripped
        } else if let Some(rest) = stripped.strip_prefix('0') {
            format!("+{default_country_code}{rest}")
        } else {
            format!("+{stripped}")
        };

        Ok(Self { value })
    }

    /// Get the phone number as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get digits only (without the `+`)
    #[must_use]
    pub fn digits(&self) -> &str {
        self.value.strip_prefix('+').unwrap_or(&self.value)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_international_number_is_kept() {
        let phone = PhoneNumber::normalized("+447797123456", "44").unwrap();
        assert_eq!(phone.as_str(), "+447797123456");
    }

    #[test]
    fn separators_are_stripped() {
        let phone = PhoneNumber::normalized("+44 (7797) 123-456", "44").unwrap();
        assert_eq!(phone.as_str(), "+447797123456");
    }

    #[test]
    fn leading_zero_becomes_country_code() {
        let phone = PhoneNumber::normalized("07797 123456", "44").unwrap();
        assert_eq!(phone.as_str(), "+447797123456");
    }

    #[test]
    fn bare_number_is_plus_prefixed() {
        let phone = PhoneNumber::normalized("447797123456", "44").unwrap();
        assert_eq!(phone.as_str(), "+447797123456");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(PhoneNumber::normalized("", "44").is_err());
        assert!(PhoneNumber::normalized("  - () ", "44").is_err());
    }

    #[test]
    fn malformed_input_is_not_rejected() {
        // Digit-level validity is checked by the booking UI, not here
        let phone = PhoneNumber::normalized("not a number", "44").unwrap();
        assert_eq!(phone.as_str(), "+notanumber");
    }

    #[test]
    fn digits_strips_the_plus() {
        let phone = PhoneNumber::normalized("07797123456", "44").unwrap();
        assert_eq!(phone.digits(), "447797123456");
    }

    #[test]
    fn display_matches_as_str() {
        let phone = PhoneNumber::normalized("0779712", "44").unwrap();
        assert_eq!(phone.to_string(), phone.as_str());
    }

    #[test]
    fn other_country_codes_are_honored() {
        let phone = PhoneNumber::normalized("06 12 34 56 78", "33").unwrap();
        assert_eq!(phone.as_str(), "+33612345678");
    }

    #[test]
    fn serialization_is_transparent() {
        let phone = PhoneNumber::normalized("07797123456", "44").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+447797123456\"");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn normalized_numbers_start_with_plus(raw in "[0-9 ()+-]{1,20}") {
            if let Ok(phone) = PhoneNumber::normalized(&raw, "44") {
                prop_assert!(phone.as_str().starts_with('+'));
            }
        }

        #[test]
        fn normalization_is_idempotent(raw in "[0-9]{6,14}") {
            let once = PhoneNumber::normalized(&raw, "44").unwrap();
            let twice = PhoneNumber::normalized(once.as_str(), "44").unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn digit_input_yields_digit_output(raw in "0[0-9]{5,12}") {
            let phone = PhoneNumber::normalized(&raw, "44").unwrap();
            prop_assert!(phone.digits().chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn separators_never_survive(raw in "[0-9]{2,4}[ -]([0-9]{2,4}[ -]){1,3}[0-9]{2,4}") {
            let phone = PhoneNumber::normalized(&raw, "44").unwrap();
            prop_assert!(!phone.as_str().contains(' '));
            prop_assert!(!phone.as_str().contains('-'));
        }
    }
}
