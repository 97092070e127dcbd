//! Planned event feed: MultiPoint features reduced to their first point.

use roadfeed_core::{LayerKey, MapMarker, MarkerKind, position_from_value};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Feature, Scalar, text};
use super::{RecordError, normalize_each};

const FALLBACK_TITLE: &str = "Planned Event";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventProperties {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    name: Option<Scalar>,
    #[serde(default, rename = "type")]
    kind: Option<Scalar>,
    #[serde(default)]
    route_name: Option<Scalar>,
}

/// Normalize planned event records.
///
/// Only the first position is used. If it is invalid the record is dropped,
/// even when later positions are valid.
#[must_use]
pub fn normalize_planned_events(records: &[Value]) -> Vec<MapMarker> {
    normalize_each(LayerKey::PlannedEvents, records, normalize_record)
}

fn normalize_record(_: usize, record: &Value) -> Result<Vec<MapMarker>, RecordError> {
    let feature = Feature::<EventProperties>::from_record(record)?;
    let props = feature.properties();
    let id = text(props.id.as_ref())
        .or_else(|| feature.feature_id())
        .ok_or(RecordError::MissingIdentifier)?;
    let coord = feature
        .geometry()?
        .positions()?
        .first()
        .and_then(position_from_value)
        .ok_or(RecordError::InvalidCoordinate)?;

    let title = text(props.name.as_ref())
        .or_else(|| text(props.kind.as_ref()))
        .unwrap_or_else(|| FALLBACK_TITLE.to_owned());
    let marker = MapMarker::new(id, MarkerKind::PlannedEvents, coord, title)?
        .with_subtitle(text(props.route_name.as_ref()))
        .with_raw_data(record.clone());
    Ok(vec![marker])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn event(coordinates: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "MultiPoint", "coordinates": coordinates},
            "properties": {"id": "ev-1", "routeName": "US-6"}
        })
    }

    #[rstest]
    fn uses_first_point_only() {
        let markers = normalize_planned_events(&[event(json!([[-105.5, 39.6], [-105.6, 39.7]]))]);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "ev-1");
        assert_eq!(markers[0].coordinate.longitude, -105.5);
        assert_eq!(markers[0].title, FALLBACK_TITLE);
        assert_eq!(markers[0].subtitle.as_deref(), Some("US-6"));
    }

    #[rstest]
    fn invalid_first_point_drops_record() {
        let markers = normalize_planned_events(&[event(json!([[-205.5, 39.6], [-105.6, 39.7]]))]);
        assert!(markers.is_empty());
    }

    #[rstest]
    fn empty_multipoint_drops_record() {
        assert!(normalize_planned_events(&[event(json!([]))]).is_empty());
    }
}
