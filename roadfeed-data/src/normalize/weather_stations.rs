//! Weather station feed: Point features with sensor readings.

use roadfeed_core::{LayerKey, MapMarker, MarkerKind};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Feature, Scalar, text};
use super::{RecordError, normalize_each};

const FALLBACK_TITLE: &str = "Weather Station";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationProperties {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    name: Option<Scalar>,
    /// Raw; entries are decoded one at a time.
    #[serde(default)]
    sensors: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sensor {
    #[serde(default, rename = "type")]
    kind: Option<Scalar>,
    #[serde(default)]
    current_reading: Option<Scalar>,
}

impl Sensor {
    fn temperature_reading(&self) -> Option<String> {
        let kind = text(self.kind.as_ref())?;
        if !kind.to_lowercase().contains("temperature") {
            return None;
        }
        text(self.current_reading.as_ref())
    }
}

/// Normalize weather station records.
///
/// The subtitle is the reading of the first temperature sensor that has
/// one.
#[must_use]
pub fn normalize_weather_stations(records: &[Value]) -> Vec<MapMarker> {
    normalize_each(LayerKey::WeatherStations, records, normalize_record)
}

fn normalize_record(_: usize, record: &Value) -> Result<Vec<MapMarker>, RecordError> {
    let feature = Feature::<StationProperties>::from_record(record)?;
    let props = feature.properties();
    let id = text(props.id.as_ref())
        .or_else(|| feature.feature_id())
        .ok_or(RecordError::MissingIdentifier)?;
    let coord = feature.point()?;
    let title = text(props.name.as_ref()).unwrap_or_else(|| FALLBACK_TITLE.to_owned());
    let subtitle = props
        .sensors
        .as_ref()
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| Sensor::deserialize(entry).ok())
        .find_map(|sensor| sensor.temperature_reading());

    let marker = MapMarker::new(id, MarkerKind::WeatherStations, coord, title)?
        .with_subtitle(subtitle)
        .with_raw_data(record.clone());
    Ok(vec![marker])
}
