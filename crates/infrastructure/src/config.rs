//! Application configuration

use application::ApplicationError;
use integration_booker::StopAction;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetryConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Booker dispatch provider configuration
    #[serde(default)]
    pub booker: BookerSettings,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// # Errors
    ///
    /// Returns an error when a source cannot be read or a value fails to
    /// deserialize.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("booker.base_url", "https://api.booker-dispatch.co.uk/v2")?
            .set_default("booker.timeout_secs", 30)?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., CORBIERE_BOOKER__COMPANY_ID)
            .add_source(
                config::Environment::with_prefix("CORBIERE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error when the Booker section is incomplete or
    /// inconsistent.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.booker
            .to_booker_config()
            .validate()
            .map_err(ApplicationError::Configuration)
    }
}

/// Booker dispatch provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct BookerSettings {
    /// Base URL for the Booker API
    #[serde(default = "default_booker_base_url")]
    pub base_url: String,

    /// Booking company identifier orders are placed under
    #[serde(default)]
    pub company_id: String,

    /// Fleet/provider identifier orders are dispatched through
    #[serde(default)]
    pub provider_id: String,

    /// Long-lived API key exchanged for bearer tokens (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Connection timeout in seconds (default: 30)
    #[serde(default = "default_booker_timeout")]
    pub timeout_secs: u64,

    /// Country calling code applied to local phone numbers (default: "44")
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Coordinates substituted for endpoints that never geocoded
    ///
    /// Configured as inline table: `{ latitude = 49.1858, longitude = -2.1089 }`.
    /// Defaults to St Helier when absent or invalid.
    #[serde(default)]
    pub fallback_location: Option<GeoLocationConfig>,

    /// How intermediate stops are marked on the wire ("waypoint" or "via")
    #[serde(default)]
    pub stop_action: StopAction,
}

impl std::fmt::Debug for BookerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookerSettings")
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

fn default_booker_base_url() -> String {
    "https://api.booker-dispatch.co.uk/v2".to_string()
}

const fn default_booker_timeout() -> u64 {
    30
}

fn default_country_code() -> String {
    "44".to_string()
}

impl Default for BookerSettings {
    fn default() -> Self {
        Self {
            base_url: default_booker_base_url(),
            company_id: String::new(),
            provider_id: String::new(),
            api_key: None,
            timeout_secs: default_booker_timeout(),
            default_country_code: default_country_code(),
            fallback_location: None,
            stop_action: StopAction::default(),
        }
    }
}

impl BookerSettings {
    /// Convert to integration_booker's BookerConfig
    #[must_use]
    pub fn to_booker_config(&self) -> integration_booker::BookerConfig {
        integration_booker::BookerConfig {
            base_url: self.base_url.clone(),
            company_id: self.company_id.clone(),
            provider_id: self.provider_id.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout_secs,
            default_country_code: self.default_country_code.clone(),
            fallback_location: self
                .fallback_location
                .and_then(|location| location.to_geo_location())
                .unwrap_or_else(domain::GeoLocation::st_helier),
            stop_action: self.stop_action,
        }
    }

    /// Get the API key as a string reference
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }
}

/// Geographic location configuration (latitude/longitude pair)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoLocationConfig {
    /// Latitude (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude (-180.0 to 180.0)
    pub longitude: f64,
}

impl GeoLocationConfig {
    /// Convert to domain GeoLocation value object
    ///
    /// Returns `None` when the pair is out of range.
    #[must_use]
    pub fn to_geo_location(&self) -> Option<domain::GeoLocation> {
        domain::GeoLocation::new(self.latitude, self.longitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(
            config.booker.base_url,
            "https://api.booker-dispatch.co.uk/v2"
        );
        assert_eq!(config.booker.timeout_secs, 30);
        assert_eq!(config.booker.default_country_code, "44");
        assert_eq!(config.telemetry.log_filter, "info");
    }

    #[test]
    fn booker_settings_default() {
        let settings = BookerSettings::default();
        assert!(settings.company_id.is_empty());
        assert!(settings.api_key.is_none());
        assert!(settings.fallback_location.is_none());
        assert_eq!(settings.stop_action, StopAction::Waypoint);
    }

    #[test]
    fn app_config_from_json() {
        let json = r#"{
            "booker": {
                "company_id": "corbiere-cars",
                "provider_id": "fleet-1",
                "api_key": "secret-key",
                "stop_action": "via"
            },
            "telemetry": {"log_filter": "debug"}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.booker.company_id, "corbiere-cars");
        assert_eq!(config.booker.provider_id, "fleet-1");
        assert_eq!(config.booker.api_key_str(), Some("secret-key"));
        assert_eq!(config.booker.stop_action, StopAction::Via);
        assert_eq!(config.telemetry.log_filter, "debug");
    }

    #[test]
    fn to_booker_config_carries_fields() {
        let settings = BookerSettings {
            company_id: "corbiere-cars".to_string(),
            provider_id: "fleet-1".to_string(),
            api_key: Some(SecretString::from("secret-key")),
            fallback_location: Some(GeoLocationConfig {
                latitude: 49.2080,
                longitude: -2.1955,
            }),
            ..BookerSettings::default()
        };

        let config = settings.to_booker_config();
        assert_eq!(config.company_id, "corbiere-cars");
        assert_eq!(config.api_key_str(), Some("secret-key"));
        assert_eq!(config.fallback_location, domain::GeoLocation::jersey_airport());
    }

    #[test]
    fn to_booker_config_defaults_fallback_to_st_helier() {
        let config = BookerSettings::default().to_booker_config();
        assert_eq!(config.fallback_location, domain::GeoLocation::st_helier());
    }

    #[test]
    fn to_booker_config_ignores_invalid_fallback() {
        let settings = BookerSettings {
            fallback_location: Some(GeoLocationConfig {
                latitude: 200.0,
                longitude: 0.0,
            }),
            ..BookerSettings::default()
        };
        let config = settings.to_booker_config();
        assert_eq!(config.fallback_location, domain::GeoLocation::st_helier());
    }

    #[test]
    fn validate_rejects_missing_identities() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        let ApplicationError::Configuration(msg) = err else {
            unreachable!()
        };
        assert!(msg.contains("company_id"));
    }

    #[test]
    fn validate_accepts_complete_settings() {
        let config = AppConfig {
            booker: BookerSettings {
                company_id: "corbiere-cars".to_string(),
                provider_id: "fleet-1".to_string(),
                ..BookerSettings::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_redacts_api_key() {
        let settings = BookerSettings {
            api_key: Some(SecretString::from("secret-key")),
            ..BookerSettings::default()
        };
        let rendered = format!("{settings:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn serialization_skips_api_key() {
        let settings = BookerSettings {
            api_key: Some(SecretString::from("secret-key")),
            ..BookerSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("api_key"));
        assert!(!json.contains("secret-key"));
    }

    #[test]
    fn geo_location_config_bounds() {
        let valid = GeoLocationConfig {
            latitude: 49.1858,
            longitude: -2.1089,
        };
        assert!(valid.to_geo_location().is_some());

        let invalid = GeoLocationConfig {
            latitude: -91.0,
            longitude: 0.0,
        };
        assert!(invalid.to_geo_location().is_none());
    }
}
