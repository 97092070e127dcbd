//! Snow plow feed: vehicle location records without a GeoJSON envelope.
//!
//! A record carries an `avl_location` object with `vehicle`, `position` and
//! `source` members. Records wrapped in a feature's `properties` are
//! unwrapped first.

use roadfeed_core::{LayerKey, MapMarker, MarkerKind, validate_lon_lat};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Scalar, text};
use super::{RecordError, normalize_each};

const FALLBACK_TITLE: &str = "Snow Plow";
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default, Deserialize)]
struct PlowRecord {
    #[serde(default)]
    rtdh_timestamp: Option<Scalar>,
    #[serde(default)]
    avl_location: Option<AvlLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AvlLocation {
    #[serde(default)]
    vehicle: Option<Vehicle>,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    source: Option<SourceInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Vehicle {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    id2: Option<Scalar>,
    #[serde(default, rename = "type")]
    kind: Option<Scalar>,
    #[serde(default)]
    fleet: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Position {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SourceInfo {
    #[serde(default)]
    collection_timestamp: Option<Scalar>,
}

impl PlowRecord {
    fn identifier(&self, vehicle: &Vehicle) -> Option<String> {
        text(vehicle.id.as_ref())
            .or_else(|| text(vehicle.id2.as_ref()))
            .or_else(|| {
                let source_ts = self
                    .avl_location
                    .as_ref()
                    .and_then(|avl| avl.source.as_ref())
                    .and_then(|source| text(source.collection_timestamp.as_ref()));
                text(self.rtdh_timestamp.as_ref())
                    .or(source_ts)
                    .map(|ts| format!("plow-{ts}"))
            })
    }
}

/// Display text with a literal "Unknown" suppressed.
fn known(field: Option<&Scalar>) -> Option<String> {
    text(field).filter(|value| !value.eq_ignore_ascii_case(UNKNOWN))
}

/// Normalize snow plow records.
#[must_use]
pub fn normalize_snow_plows(records: &[Value]) -> Vec<MapMarker> {
    normalize_each(LayerKey::SnowPlows, records, normalize_record)
}

fn normalize_record(_: usize, record: &Value) -> Result<Vec<MapMarker>, RecordError> {
    let body = record
        .get("properties")
        .filter(|props| props.is_object())
        .unwrap_or(record);
    let plow = PlowRecord::deserialize(body)?;
    let avl = plow.avl_location.clone().unwrap_or_default();
    let vehicle = avl.vehicle.unwrap_or_default();

    let id = plow
        .identifier(&vehicle)
        .ok_or(RecordError::MissingIdentifier)?;
    let position = avl.position.ok_or(RecordError::MissingGeometry)?;
    let coord = position
        .longitude
        .zip(position.latitude)
        .and_then(|(lon, lat)| validate_lon_lat(lon, lat))
        .ok_or(RecordError::InvalidCoordinate)?;

    let title = known(vehicle.kind.as_ref()).unwrap_or_else(|| FALLBACK_TITLE.to_owned());
    let marker = MapMarker::new(id, MarkerKind::SnowPlows, coord, title)?
        .with_subtitle(known(vehicle.fleet.as_ref()))
        .with_raw_data(record.clone());
    Ok(vec![marker])
}
