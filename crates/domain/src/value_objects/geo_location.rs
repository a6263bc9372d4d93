//! Geographic location value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// A geographic location with latitude and longitude
///
/// Booking endpoints that cannot be geocoded fall back to
/// [`GeoLocation::st_helier`], the centre of the operating region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

/// Error type for invalid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCoordinates;

impl fmt::Display for InvalidCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180"
        )
    }
}

impl std::error::Error for InvalidCoordinates {}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a location without validation (for trusted sources)
    ///
    /// Caller must ensure latitude is in [-90, 90] and longitude in
    /// [-180, 180].
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Well-known locations in the operating region
impl GeoLocation {
    /// St Helier town centre, the regional fallback for failed geocoding
    #[must_use]
    pub const fn st_helier() -> Self {
        Self::new_unchecked(49.1858, -2.1089)
    }

    /// Jersey Airport (St Peter)
    #[must_use]
    pub const fn jersey_airport() -> Self {
        Self::new_unchecked(49.2080, -2.1955)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_coordinates_accepted() {
        let loc = GeoLocation::new(49.1858, -2.1089).expect("valid coordinates");
        assert!((loc.latitude() - 49.1858).abs() < f64::EPSILON);
        assert!((loc.longitude() - -2.1089).abs() < f64::EPSILON);
    }

    #[test]
    fn boundary_coordinates_accepted() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());
        assert!(GeoLocation::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        assert!(GeoLocation::new(91.0, 0.0).is_err());
        assert!(GeoLocation::new(-91.0, 0.0).is_err());
    }

    #[test]
    fn out_of_range_longitude_rejected() {
        assert!(GeoLocation::new(0.0, 181.0).is_err());
        assert!(GeoLocation::new(0.0, -181.0).is_err());
    }

    #[test]
    fn display_shows_six_decimals() {
        let loc = GeoLocation::new(49.1858, -2.1089).expect("valid");
        assert_eq!(loc.to_string(), "49.185800, -2.108900");
    }

    #[test]
    fn fallback_locations_are_in_region() {
        let st_helier = GeoLocation::st_helier();
        assert!((st_helier.latitude() - 49.1858).abs() < 0.01);
        let airport = GeoLocation::jersey_airport();
        assert!(airport.longitude() < st_helier.longitude());
    }

    #[test]
    fn serialization_roundtrip() {
        let loc = GeoLocation::new(49.2080, -2.1955).expect("valid");
        let json = serde_json::to_string(&loc).expect("serialize");
        let parsed: GeoLocation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(loc, parsed);
    }
}
