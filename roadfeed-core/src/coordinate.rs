//! Validation of raw `[longitude, latitude]` positions.
//!
//! Every normalizer funnels its geometry through these predicates, so any
//! coordinate that reaches the layer cache is finite and in range.
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`.

use std::ops::RangeInclusive;

use geo::Coord;
use serde_json::Value;

/// Valid longitude bounds in degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Valid latitude bounds in degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Range-check a numeric longitude/latitude pair.
///
/// # Examples
/// ```
/// use roadfeed_core::validate_lon_lat;
///
/// assert!(validate_lon_lat(-105.0, 39.7).is_some());
/// assert!(validate_lon_lat(10.0, 200.0).is_none());
/// assert!(validate_lon_lat(f64::NAN, 0.0).is_none());
/// ```
#[must_use]
pub fn validate_lon_lat(longitude: f64, latitude: f64) -> Option<Coord<f64>> {
    (longitude.is_finite()
        && latitude.is_finite()
        && LONGITUDE_RANGE.contains(&longitude)
        && LATITUDE_RANGE.contains(&latitude))
    .then_some(Coord {
        x: longitude,
        y: latitude,
    })
}

/// Decode a GeoJSON position, accepting only an array of exactly two
/// in-range numbers.
///
/// Positions carrying an altitude are rejected along with everything else
/// that is not a plain pair.
///
/// # Examples
/// ```
/// use roadfeed_core::position_from_value;
/// use serde_json::json;
///
/// let coord = position_from_value(&json!([-105.0, 39.7])).expect("valid pair");
/// assert_eq!((coord.x, coord.y), (-105.0, 39.7));
/// assert!(position_from_value(&json!([-105.0, 39.7, 1600.0])).is_none());
/// assert!(position_from_value(&json!(["-105.0", "39.7"])).is_none());
/// ```
#[must_use]
pub fn position_from_value(candidate: &Value) -> Option<Coord<f64>> {
    let [longitude, latitude] = candidate.as_array()?.as_slice() else {
        return None;
    };
    validate_lon_lat(longitude.as_f64()?, latitude.as_f64()?)
}

/// Return `true` iff `candidate` is a valid `[longitude, latitude]` pair.
#[must_use]
pub fn is_valid_position(candidate: &Value) -> bool {
    position_from_value(candidate).is_some()
}
