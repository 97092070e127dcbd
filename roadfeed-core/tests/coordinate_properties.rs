//! Property-based tests for the coordinate validator.
//!
//! # Invariants tested
//!
//! - **Range agreement:** a numeric pair is accepted iff both values are
//!   finite and inside the WGS84 bounds.
//! - **Marker safety:** a marker can only be built from an accepted pair.

use geo::Coord;
use proptest::prelude::*;
use roadfeed_core::{MapMarker, MarkerKind, is_valid_position, validate_lon_lat};
use serde_json::json;

/// Longitudes spanning well beyond the valid range, plus specials.
fn longitude_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        -360.0_f64..360.0_f64,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(-180.0),
        Just(180.0),
    ]
}

/// Latitudes spanning well beyond the valid range, plus specials.
fn latitude_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        -270.0_f64..270.0_f64,
        Just(f64::NAN),
        Just(f64::NEG_INFINITY),
        Just(-90.0),
        Just(90.0),
    ]
}

fn in_range(longitude: f64, latitude: f64) -> bool {
    longitude.is_finite()
        && latitude.is_finite()
        && (-180.0..=180.0).contains(&longitude)
        && (-90.0..=90.0).contains(&latitude)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the validator agrees with the WGS84 bounds.
    #[test]
    fn validator_matches_bounds(
        longitude in longitude_strategy(),
        latitude in latitude_strategy(),
    ) {
        prop_assert_eq!(validate_lon_lat(longitude, latitude).is_some(), in_range(longitude, latitude));
    }

    /// Property: JSON pairs are accepted iff the numeric check passes.
    ///
    /// Non-finite values cannot be represented in JSON and serialize as
    /// `null`, which must also be rejected.
    #[test]
    fn json_pairs_match_numeric_check(
        longitude in longitude_strategy(),
        latitude in latitude_strategy(),
    ) {
        let candidate = json!([longitude, latitude]);
        prop_assert_eq!(is_valid_position(&candidate), in_range(longitude, latitude));
    }

    /// Property: markers never carry an out-of-range coordinate.
    #[test]
    fn markers_only_hold_valid_coordinates(
        longitude in longitude_strategy(),
        latitude in latitude_strategy(),
    ) {
        let result = MapMarker::new(
            "probe",
            MarkerKind::WeatherStations,
            Coord { x: longitude, y: latitude },
            "Probe",
        );
        match result {
            Ok(marker) => {
                prop_assert!(in_range(marker.coordinate.longitude, marker.coordinate.latitude));
            }
            Err(_) => prop_assert!(!in_range(longitude, latitude)),
        }
    }
}
