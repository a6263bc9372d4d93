//! Booker service configuration

use domain::GeoLocation;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::models::StopAction;

/// Configuration for the Booker dispatch API
#[derive(Clone, Serialize, Deserialize)]
pub struct BookerConfig {
    /// Base URL for the Booker API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Booking company identifier orders are placed under
    #[serde(default)]
    pub company_id: String,

    /// Fleet/provider identifier orders are dispatched through
    #[serde(default)]
    pub provider_id: String,

    /// Long-lived API key exchanged for bearer tokens (sensitive)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Country calling code applied to local phone numbers (Jersey: 44)
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Coordinates used for endpoints that never geocoded
    #[serde(default = "default_fallback_location")]
    pub fallback_location: GeoLocation,

    /// How intermediate stops are marked on the wire
    #[serde(default)]
    pub stop_action: StopAction,
}

impl std::fmt::Debug for BookerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookerConfig")
            .field("base_url", &self.base_url)
            .field("company_id", &self.company_id)
            .field("provider_id", &self.provider_id)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("default_country_code", &self.default_country_code)
            .field("fallback_location", &self.fallback_location)
            .field("stop_action", &self.stop_action)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.booker-dispatch.co.uk/v2".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_country_code() -> String {
    "44".to_string()
}

const fn default_fallback_location() -> GeoLocation {
    GeoLocation::st_helier()
}

impl Default for BookerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            company_id: String::new(),
            provider_id: String::new(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            default_country_code: default_country_code(),
            fallback_location: default_fallback_location(),
            stop_action: StopAction::default(),
        }
    }
}

impl BookerConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            company_id: "corbiere-test".to_string(),
            provider_id: "fleet-1".to_string(),
            api_key: Some(SecretString::from("test-api-key")),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Get the API key as a string reference (for token issuance)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Join a path onto the base URL, tolerating a trailing slash
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.company_id.trim().is_empty() {
            return Err("company_id must not be empty".to_string());
        }

        if self.provider_id.trim().is_empty() {
            return Err("provider_id must not be empty".to_string());
        }

        if self.default_country_code.is_empty()
            || !self
                .default_country_code
                .chars()
                .all(|c| c.is_ascii_digit())
        {
            return Err("default_country_code must be a calling code like \"44\"".to_string());
        }

        Ok(())
    }
}
