//! Coordinate and time conversion for the Booker wire format
//!
//! The Booker API carries coordinates as integers (degrees × 1,000,000)
//! and instants as whole epoch seconds. An unconstrained "as soon as
//! possible" pickup is the epoch literal `0` everywhere on the wire; the
//! node-level arrival block is simply omitted in that case.

use chrono::{DateTime, Utc};
use domain::{GeoLocation, TimingIntent};

/// Degrees-to-integer scaling factor used by the provider
pub const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Wire encoding of an unconstrained pickup time
pub const ASAP_EPOCH: i64 = 0;

/// Convert a location to provider-scale integers, longitude first
///
/// Values are rounded to the nearest integer, giving a resolution of
/// one millionth of a degree (about 11 cm at the equator).
#[must_use]
pub fn encode_location(location: GeoLocation) -> (i64, i64) {
    (
        scale_degrees(location.longitude()),
        scale_degrees(location.latitude()),
    )
}

/// Convert provider-scale integers back to a location
///
/// The inverse of [`encode_location`]; round trips stay within
/// ±0.000001 degrees.
#[must_use]
#[allow(clippy::cast_precision_loss)] // provider-scale magnitudes fit f64 exactly
pub fn decode_location(lng: i64, lat: i64) -> GeoLocation {
    GeoLocation::new_unchecked(lat as f64 / COORDINATE_SCALE, lng as f64 / COORDINATE_SCALE)
}

/// Scale one coordinate component to the provider's integer form
#[must_use]
#[allow(clippy::cast_possible_truncation)] // bounded by ±180° × 1e6
pub fn scale_degrees(degrees: f64) -> i64 {
    (degrees * COORDINATE_SCALE).round() as i64
}

/// Encode a departure intent as epoch seconds; ASAP is the literal `0`
#[must_use]
pub fn encode_timing(timing: &TimingIntent) -> i64 {
    timing.scheduled_at().map_or(ASAP_EPOCH, encode_instant)
}

/// Encode an instant as whole epoch seconds (sub-second precision dropped)
#[must_use]
pub fn encode_instant(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_location_scales_and_orders() {
        let (lng, lat) = encode_location(GeoLocation::st_helier());
        assert_eq!(lng, -2_108_900);
        assert_eq!(lat, 49_185_800);

        let (lng, lat) = encode_location(GeoLocation::jersey_airport());
        assert_eq!(lng, -2_195_500);
        assert_eq!(lat, 49_208_000);
    }

    #[test]
    fn test_scale_rounds_to_nearest() {
        assert_eq!(scale_degrees(49.185_800_4), 49_185_800);
        assert_eq!(scale_degrees(49.185_800_6), 49_185_801);
        assert_eq!(scale_degrees(-2.108_950), -2_108_950);
        assert_eq!(scale_degrees(0.0), 0);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let original = GeoLocation::new(49.214_361, -2.131_028).unwrap();
        let (lng, lat) = encode_location(original);
        let decoded = decode_location(lng, lat);

        assert!((decoded.latitude() - original.latitude()).abs() < 1.0e-6);
        assert!((decoded.longitude() - original.longitude()).abs() < 1.0e-6);
    }

    #[test]
    fn test_asap_encodes_as_zero() {
        assert_eq!(encode_timing(&TimingIntent::Asap), 0);
    }

    #[test]
    fn test_scheduled_encodes_whole_seconds() {
        let at = DateTime::from_timestamp(1_773_480_600, 500_000_000).unwrap();
        assert_eq!(encode_timing(&TimingIntent::Scheduled { at }), 1_773_480_600);
        assert_eq!(encode_instant(at), 1_773_480_600);
    }
}
